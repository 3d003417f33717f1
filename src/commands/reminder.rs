//! Reminder command handler

use tracing::{error, info};

use crate::core::reminder::{build_digest, ReminderDigest};
use crate::AppState;

/// Build the pending-task digest from a fresh read of the sheet.
///
/// Works on the raw rows, so entries without a date of their own keep an
/// empty date here.
pub async fn pending_digest(state: &AppState) -> Result<Option<ReminderDigest>, String> {
    info!("⏳ Building pending-task reminder");

    let records = match state.source.fetch_records().await {
        Ok(records) => records,
        Err(e) => {
            error!("❌ Failed to read sheet for reminder: {}", e);
            return Err(e.to_string());
        }
    };

    let reminder = state.config.read().await.reminder.clone();
    match build_digest(&records, &reminder) {
        Ok(digest) => {
            if let Some(digest) = &digest {
                info!("✅ Reminder ready: {}", digest.subject);
            }
            Ok(digest)
        }
        Err(e) => {
            error!("❌ Failed to build reminder: {}", e);
            Err(e.to_string())
        }
    }
}
