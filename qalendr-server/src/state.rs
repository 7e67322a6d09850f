use std::sync::Arc;

use anyhow::Result;
use qalendr_core::Dataset;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // The bundled tables are immutable, so one parse at startup is enough
    dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let dataset = Dataset::bundled()?;
        Ok(AppState {
            dataset: Arc::new(dataset),
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}
