//! Axum route handlers for the Layout API.
//!
//! The reflow and export handlers build a `MemTree` from the posted snapshot
//! and drop it before returning; nothing is awaited while it is alive.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export::{build_export_document, ExportDocument};
use crate::layout::mem_tree::{MemTree, PageSections, TreeSnapshot};
use crate::layout::pre_paginate::{pre_paginate, PagePartition, PrePaginateParams};
use crate::layout::reflow::{repaginate, ReflowReport};
use crate::layout::tree::PageTree;
use crate::resume::{LayoutMode, SectionId};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaginateRequest {
    #[serde(default)]
    pub layout: LayoutMode,
    pub section_order: Vec<String>,
    pub heights: BTreeMap<String, f32>,
    /// Overrides the configured pre-pagination capacity.
    #[serde(default)]
    pub capacity_px: Option<f32>,
    #[serde(default)]
    pub first_page_main_offset_px: f32,
    #[serde(default)]
    pub first_page_side_offset_px: f32,
}

#[derive(Debug, Serialize)]
pub struct PaginateResponse {
    pub page_count: usize,
    pub partition: PagePartition,
}

#[derive(Debug, Deserialize)]
pub struct ReflowRequest {
    pub tree: TreeSnapshot,
    /// Overrides `LayoutConfig::drain_first_page` for this pass.
    #[serde(default)]
    pub drain_first_page: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ReflowResponse {
    pub tree: TreeSnapshot,
    pub pages: Vec<PageSections>,
    pub markup: String,
    pub report: ReflowReport,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub tree: TreeSnapshot,
    #[serde(default)]
    pub full_name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout/paginate
///
/// One-shot partition from measured section heights.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<PaginateRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let order = parse_section_order(&request.section_order)?;
    let heights = parse_section_heights(&request.heights)?;
    let capacity_px = match request.capacity_px {
        Some(c) if c.is_finite() && c > 0.0 => c,
        Some(c) => {
            return Err(AppError::Validation(format!(
                "capacity_px must be a positive number, got {c}"
            )))
        }
        None => state.layout.prepaginate_capacity_px(),
    };

    let params = PrePaginateParams {
        mode: request.layout,
        capacity_px,
        section_gap_px: state.layout.section_gap_px,
        first_page_main_offset_px: request.first_page_main_offset_px,
        first_page_side_offset_px: request.first_page_side_offset_px,
    };
    let partition = pre_paginate(&order, &heights, &params);

    Ok(Json(PaginateResponse {
        page_count: partition.len(),
        partition,
    }))
}

/// POST /api/v1/layout/reflow
///
/// Runs one live repagination pass over a measured tree snapshot.
pub async fn handle_reflow(
    State(state): State<AppState>,
    Json(request): Json<ReflowRequest>,
) -> Result<Json<ReflowResponse>, AppError> {
    if request.tree.pages.is_empty() {
        return Err(AppError::Validation("tree must contain at least one page".to_string()));
    }

    let mut config = state.layout.clone();
    if let Some(drain) = request.drain_first_page {
        config.drain_first_page = drain;
    }

    let mut tree = MemTree::from_snapshot(&request.tree, config.page_gap_px);
    let report = repaginate(&mut tree, &config);

    Ok(Json(ReflowResponse {
        tree: tree.to_snapshot(),
        pages: tree.page_sections(),
        markup: tree.snapshot_markup(),
        report,
    }))
}

/// POST /api/v1/layout/export
///
/// Builds the fixed-size page payload handed to the external PDF assembler.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportDocument>, AppError> {
    let tree = MemTree::from_snapshot(&request.tree, state.layout.page_gap_px);
    let document = build_export_document(&tree, &state.layout, &request.full_name)
        .map_err(|e| AppError::Validation(e.user_message()))?;
    Ok(Json(document))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared request parsing
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn parse_section_order(ids: &[String]) -> Result<Vec<SectionId>, AppError> {
    ids.iter()
        .map(|id| id.parse::<SectionId>().map_err(AppError::Validation))
        .collect()
}

pub(crate) fn parse_section_heights(
    heights: &BTreeMap<String, f32>,
) -> Result<BTreeMap<SectionId, f32>, AppError> {
    heights
        .iter()
        .map(|(id, &height)| {
            let id = id.parse::<SectionId>().map_err(AppError::Validation)?;
            if !height.is_finite() || height < 0.0 {
                return Err(AppError::Validation(format!(
                    "height for '{id}' must be a non-negative number"
                )));
            }
            Ok((id, height))
        })
        .collect()
}
