use std::sync::Arc;

use crate::agent::ResumeAgent;
use crate::config::Config;
use crate::layout::LayoutConfig;
use crate::profiles::ProfileRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator. Default: `PgProfileRepository`.
    pub repo: Arc<dyn ProfileRepository>,
    /// Draft generation collaborator. Default: `LlmResumeAgent`.
    pub agent: Arc<dyn ResumeAgent>,
    pub config: Config,
    /// Page geometry and reflow tunables derived from `PAGE_DPI`.
    pub layout: LayoutConfig,
}
