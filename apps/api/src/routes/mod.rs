pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::drafts::handlers as drafts;
use crate::layout::handlers as layout;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route("/api/v1/profiles/:id", get(profiles::handle_get_profile))
        // Drafts
        .route("/api/v1/drafts/generate", post(drafts::handle_generate_draft))
        .route("/api/v1/drafts/:id", get(drafts::handle_get_draft))
        .route("/api/v1/drafts/:id/render", post(drafts::handle_render_draft))
        .route("/api/v1/drafts/:id/markup", put(drafts::handle_commit_markup))
        .route("/api/v1/drafts/:id/diff", post(drafts::handle_diff_draft))
        // Layout
        .route("/api/v1/layout/paginate", post(layout::handle_paginate))
        .route("/api/v1/layout/reflow", post(layout::handle_reflow))
        .route("/api/v1/layout/export", post(layout::handle_export))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
