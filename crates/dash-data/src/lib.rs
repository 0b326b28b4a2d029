//! Tables, views and the data manager for the dashboard

pub mod config;
pub mod fetch;
pub mod manager;
pub mod sources;
pub mod view;

use dash_core::FilterError;
use thiserror::Error;

// Re-exports
pub use config::DataConfig;
pub use fetch::{RemoteFetcher, RemoteOperation, RemoteRequest};
pub use manager::{DataManager, ManagerRecord};
pub use sources::{construct_table, ExplicitTable, RemoteTable, Table, TableContext};
pub use view::{FilterRegistry, TableRegistry, View};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Invalid table specification for '{0}': expected exactly one of rows or connector")]
    InvalidTableSpec(String),

    #[error("No remote fetcher configured for table '{0}'")]
    NoFetcher(String),
}
