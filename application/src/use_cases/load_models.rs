//! Load models use case
//!
//! Fetches the model catalog once at startup and hands it to the
//! [`SessionManager`](crate::session::manager::SessionManager). A failing
//! catalog is not fatal: sessions keep the configured default model.

use crate::ports::model_catalog::{CatalogError, ModelCatalog};
use crate::session::manager::SessionManager;
use multichat_domain::ModelDescriptor;
use std::sync::Arc;
use tracing::{info, warn};

pub struct LoadModelsUseCase {
    catalog: Arc<dyn ModelCatalog>,
}

impl LoadModelsUseCase {
    pub fn new(catalog: Arc<dyn ModelCatalog>) -> Self {
        Self { catalog }
    }

    /// Fetch the catalog without applying it.
    pub async fn fetch(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let models = self.catalog.list_models().await?;
        info!(count = models.len(), "Fetched model catalog");
        Ok(models)
    }

    /// Fetch the catalog and apply it to the manager.
    ///
    /// Returns the number of models loaded.
    pub async fn execute(&self, manager: &mut SessionManager) -> Result<usize, CatalogError> {
        match self.fetch().await {
            Ok(models) => {
                let count = models.len();
                manager.set_available_models(models);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load models: {}", e);
                Err(e)
            }
        }
    }
}
