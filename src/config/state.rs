// Application state module
// Immutable state shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::drive::ImageLister;

/// Application state
///
/// Holds the loaded configuration and the injected image source. Nothing in
/// here is mutable; every request works against the same snapshot.
pub struct AppState {
    pub config: Config,
    pub images: Arc<dyn ImageLister>,
}

impl AppState {
    pub fn new(config: Config, images: Arc<dyn ImageLister>) -> Self {
        Self { config, images }
    }
}
