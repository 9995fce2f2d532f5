use std::sync::Arc;

use crate::report::ReportRenderer;
use crate::research::service::{GrantsSource, ResearchModel};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Language-model upstream. Default: `LlmClient`.
    pub llm: Arc<dyn ResearchModel>,
    /// Grants-database upstream. Default: `GrantsClient`.
    pub grants: Arc<dyn GrantsSource>,
    /// Report renderer. Default backend: DOCX.
    pub renderer: ReportRenderer,
}
