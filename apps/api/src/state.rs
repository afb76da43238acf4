use std::sync::Arc;

use crate::capture::ImageCapture;
use crate::reports::ReportRequester;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub requester: ReportRequester,
    /// Source of the PPDT stimulus. Default: `FileStimulus` on `PPDT_IMAGE_PATH`.
    pub capture: Arc<dyn ImageCapture>,
}
