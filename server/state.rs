use std::sync::Arc;

use image_tiles::{Location, RenderOptions, S3Config, Storage};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Startup configuration, built once from the command line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Folder being served.
    pub root: Location,
    /// Options used when a request does not override them.
    pub defaults: RenderOptions,
    /// Default number of tiles per gallery page.
    pub num_items: usize,
    /// Initial tiles-per-row slider value.
    pub items_per_row: usize,
    /// Wildcard matched against file names when listing.
    pub pattern: String,
    pub recursive: bool,
    pub s3: S3Config,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by every request thread. Nothing in here changes after
/// startup, so it is shared without a lock.
pub struct AppState {
    pub config: ServerConfig,
    pub storage: Storage,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let storage = Storage::new(config.s3.clone());
        AppState { config, storage }
    }
}

pub type SharedState = Arc<AppState>;
