//! Core business logic module
//!
//! Domain models, configuration, the sheet-facing clients and the task log
//! state that sits between them.

pub mod config;
pub mod models;
pub mod mutation_client;
pub mod reminder;
pub mod sheet_source;
pub mod task_log;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake_transport;



// Re-export commonly used types
pub use config::AppConfig;
pub use models::{AppError, AppResult, MutationOutcome, Record};
pub use mutation_client::MutationClient;
pub use sheet_source::SheetSource;
pub use task_log::TaskLog;
pub use transport::{ReqwestTransport, SheetTransport};
