//! Client for the row-mutation endpoint
//!
//! Each mutation is one GET with the JSON payload URL-encoded into a
//! `payload` query parameter. Replies are never read, so a successful
//! [`MutationOutcome`] means "sent", not "applied".

use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::config::EndpointConfig;
use super::models::{
    AppError, AppResult, MutationAction, MutationOutcome, MutationPayload, MutationResponse,
    Record,
};
use super::transport::SheetTransport;

/// First sheet row that holds data; row 1 is the header
pub const FIRST_DATA_ROW: u32 = 2;

pub struct MutationClient {
    endpoint: EndpointConfig,
    transport: Arc<dyn SheetTransport>,
}

impl MutationClient {
    pub fn new(endpoint: EndpointConfig, transport: Arc<dyn SheetTransport>) -> Self {
        if endpoint.is_mock() {
            info!("No mutation endpoint configured, running in mock mode");
        }
        Self {
            endpoint,
            transport,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.endpoint.is_mock()
    }

    /// Append a row
    pub async fn create_row(&self, data: Record) -> MutationOutcome {
        self.dispatch(MutationPayload {
            action: MutationAction::Add,
            index: None,
            data: Some(data),
        })
        .await
    }

    /// Overwrite physical sheet row `sheet_row`
    pub async fn update_row(&self, sheet_row: u32, data: Record) -> MutationOutcome {
        self.dispatch(MutationPayload {
            action: MutationAction::Update,
            index: Some(sheet_row),
            data: Some(data),
        })
        .await
    }

    /// Remove physical sheet row `sheet_row`
    pub async fn delete_row(&self, sheet_row: u32) -> MutationOutcome {
        self.dispatch(MutationPayload {
            action: MutationAction::Delete,
            index: Some(sheet_row),
            data: None,
        })
        .await
    }

    /// Endpoint URL with `payload` attached
    pub fn payload_url(&self, payload: &MutationPayload) -> AppResult<Url> {
        let mut url = Url::parse(self.endpoint.apps_script_url.trim())
            .map_err(|e| AppError::Config(format!("Invalid mutation endpoint URL: {}", e)))?;
        let json =
            serde_json::to_string(payload).map_err(|e| AppError::Parse(e.to_string()))?;
        url.query_pairs_mut().append_pair("payload", &json);
        Ok(url)
    }

    async fn dispatch(&self, payload: MutationPayload) -> MutationOutcome {
        // Mock mode acknowledges everything, header row included
        if self.is_mock() {
            debug!("Mock {:?} acknowledged without sending", payload.action);
            return MutationOutcome::mocked();
        }

        if let Some(index) = payload.index {
            if index < FIRST_DATA_ROW {
                warn!("Refusing {:?} on sheet row {}", payload.action, index);
                return MutationOutcome::failed(format!("Invalid row index: {}", index));
            }
        }

        let url = match self.payload_url(&payload) {
            Ok(url) => url,
            Err(e) => return MutationOutcome::failed(e.to_string()),
        };

        match self.transport.send_unconfirmed(&url).await {
            Ok(()) => {
                debug!("{:?} sent for row {:?}", payload.action, payload.index);
                MutationOutcome::sent()
            }
            Err(e) => {
                warn!("{:?} could not be sent: {}", payload.action, e);
                MutationOutcome::failed(e.to_string())
            }
        }
    }
}

/// Decode a reply body from the endpoint, for callers that can read one
pub fn parse_response(body: &str) -> AppResult<MutationResponse> {
    serde_json::from_str(body).map_err(|e| AppError::Parse(e.to_string()))
}
