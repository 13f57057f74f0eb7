//! Axum route handlers for the Drafts API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::drafts::diff::{diff_drafts, header_provenance, DraftDiff, HeaderProvenance};
use crate::errors::AppError;
use crate::layout::handlers::{parse_section_heights, parse_section_order};
use crate::layout::pre_paginate::{pre_paginate, PagePartition, PrePaginateParams};
use crate::models::draft::{Draft, NewDraft};
use crate::render::{assemble_pages, render_sections, AssembleOptions, SectionFragments};
use crate::resume::{LayoutMode, ResumeContent, SectionId};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateDraftRequest {
    pub profile_id: Uuid,
    pub job_description: String,
    #[serde(default)]
    pub layout: LayoutMode,
    /// Defaults to every section in canonical order.
    #[serde(default)]
    pub section_order: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RenderRequest {
    #[serde(default)]
    pub layout: Option<LayoutMode>,
    #[serde(default)]
    pub section_order: Option<Vec<String>>,
    /// Measured heights; when present the pre-paginator partitions the pages.
    #[serde(default)]
    pub section_heights: Option<BTreeMap<String, f32>>,
    #[serde(default)]
    pub first_page_main_offset_px: f32,
    #[serde(default)]
    pub first_page_side_offset_px: f32,
    #[serde(default)]
    pub show_gaps: Option<bool>,
    #[serde(default)]
    pub accent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub draft_id: Uuid,
    pub layout: LayoutMode,
    pub order: Vec<SectionId>,
    pub fragments: SectionFragments,
    pub partition: PagePartition,
    pub markup: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitMarkupRequest {
    pub markup: String,
}

#[derive(Debug, Deserialize)]
pub struct DiffRequest {
    pub content: ResumeContent,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub dirty: bool,
    pub diff: DraftDiff,
    pub provenance: HeaderProvenance,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/drafts/generate
///
/// Loads the profile, asks the resume agent for tailored content and stores
/// the result as a new draft.
pub async fn handle_generate_draft(
    State(state): State<AppState>,
    Json(request): Json<GenerateDraftRequest>,
) -> Result<(StatusCode, Json<Draft>), AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let section_order = match &request.section_order {
        Some(ids) => parse_section_order(ids)?,
        None => SectionId::ALL.to_vec(),
    };

    let profile = state
        .repo
        .get_profile(request.profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", request.profile_id)))?;

    let generated = state
        .agent
        .generate(&profile, &request.job_description)
        .await?
        .into_content(&profile.content);

    let draft = state
        .repo
        .save_draft(NewDraft {
            profile_id: profile.id,
            job_description: request.job_description.trim().to_string(),
            layout: request.layout,
            section_order,
            generated,
            original: profile.content,
        })
        .await?;

    info!(draft = %draft.id, profile = %draft.profile_id, "draft created");
    Ok((StatusCode::CREATED, Json(draft)))
}

/// GET /api/v1/drafts/:id
pub async fn handle_get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Draft>, AppError> {
    Ok(Json(load_draft(&state, id).await?))
}

/// POST /api/v1/drafts/:id/render
///
/// Section fragments plus assembled page markup for the editor's first paint.
pub async fn handle_render_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    let draft = load_draft(&state, id).await?;
    let mode = request.layout.unwrap_or(draft.layout);

    let requested = match &request.section_order {
        Some(ids) => parse_section_order(ids)?,
        None => draft.section_order.clone(),
    };
    let order = draft.content.non_empty_order(&requested);
    let fragments = render_sections(&draft.content, mode);

    let partition = match &request.section_heights {
        Some(heights) => {
            let heights = parse_section_heights(heights)?;
            let params = PrePaginateParams {
                mode,
                capacity_px: state.layout.prepaginate_capacity_px(),
                section_gap_px: state.layout.section_gap_px,
                first_page_main_offset_px: request.first_page_main_offset_px,
                first_page_side_offset_px: request.first_page_side_offset_px,
            };
            pre_paginate(&order, &heights, &params)
        }
        None => vec![order.clone()],
    };

    let options = AssembleOptions {
        mode,
        show_gaps: request.show_gaps.unwrap_or(true),
        accent: request.accent.clone(),
    };
    let markup = assemble_pages(
        &order,
        &partition,
        &fragments,
        &draft.content.header,
        &options,
    );

    Ok(Json(RenderResponse {
        draft_id: draft.id,
        layout: mode,
        order,
        fragments,
        partition,
        markup,
    }))
}

/// PUT /api/v1/drafts/:id/markup
///
/// Stores the paginated snapshot the editor hands over on blur.
pub async fn handle_commit_markup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommitMarkupRequest>,
) -> Result<StatusCode, AppError> {
    if request.markup.trim().is_empty() {
        return Err(AppError::Validation("markup cannot be empty".to_string()));
    }
    state
        .repo
        .commit_markup(id, &request.markup)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Draft {id} not found")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/drafts/:id/diff
///
/// Compares edited content against the generated baseline.
pub async fn handle_diff_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DiffRequest>,
) -> Result<Json<DiffResponse>, AppError> {
    let draft = load_draft(&state, id).await?;
    let diff = diff_drafts(&draft.generated, &request.content);
    let provenance = header_provenance(
        &request.content.header,
        &draft.generated.header,
        &draft.original.header,
    );
    Ok(Json(DiffResponse {
        dirty: diff.is_dirty(),
        diff,
        provenance,
    }))
}

async fn load_draft(state: &AppState, id: Uuid) -> Result<Draft, AppError> {
    state
        .repo
        .get_draft(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Draft {id} not found")))
}
