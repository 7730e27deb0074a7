use std::sync::Arc;

use crate::analysis::engine::AnalysisEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}
