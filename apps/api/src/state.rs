use std::sync::Arc;

use crate::config::Config;
use crate::ingest::client::ExtractionService;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Upstream extraction. Default: HttpExtractionClient against EXTRACTION_SERVICE_URL.
    pub extraction: Arc<dyn ExtractionService>,
}
