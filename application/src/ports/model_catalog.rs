//! Model catalog port
//!
//! Fetches the list of models the backend can serve, used to populate the
//! per-session model selector.

use async_trait::async_trait;
use multichat_domain::ModelDescriptor;
use thiserror::Error;

/// Errors that can occur while loading the model list
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of available models
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError>;
}
