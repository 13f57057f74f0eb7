//! Export: hands the finalized pages to an external PDF assembler.
//!
//! The paginated tree is read once into an owned `ExportDocument` (fixed page
//! size, per-page markup, link boxes in page coordinates) before any await, so
//! the tree itself is never touched by a running export. Failures surface as
//! user-visible text through `ExportError::user_message`.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::layout::page_config::LayoutConfig;
use crate::layout::tree::{LinkRegion, PageTree};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    Busy,

    #[error("document has no pages")]
    Empty,

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("pdf assembly failed: {0}")]
    Assemble(String),
}

impl ExportError {
    /// Text suitable for showing next to the download control.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::Busy => "A download is already in progress.".to_string(),
            ExportError::Empty => "There is nothing to download yet.".to_string(),
            ExportError::Rasterize(_) | ExportError::Assemble(_) => {
                "Could not create the PDF. Please try again.".to_string()
            }
        }
    }
}

/// One fixed-size page ready for rasterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPage {
    pub index: usize,
    pub width_px: f32,
    pub height_px: f32,
    pub markup: String,
    /// Link boxes relative to the page's top-left corner.
    pub links: Vec<LinkRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub file_name: String,
    pub pages: Vec<ExportPage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// External rasterization / PDF assembly routine.
#[async_trait]
pub trait PdfSink: Send + Sync {
    async fn assemble(&self, document: &ExportDocument) -> Result<PdfArtifact, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Document building
// ────────────────────────────────────────────────────────────────────────────

/// Reads every page of `tree` into an owned export payload.
pub fn build_export_document<T: PageTree>(
    tree: &T,
    config: &LayoutConfig,
    full_name: &str,
) -> Result<ExportDocument, ExportError> {
    let pages = tree.pages();
    if pages.is_empty() {
        return Err(ExportError::Empty);
    }

    let pages = pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| ExportPage {
            index,
            width_px: config.page_width_px,
            height_px: config.page_height_px,
            markup: tree.page_markup(page),
            links: tree
                .link_regions(page)
                .into_iter()
                .map(|link| LinkRegion {
                    rect: link.rect.translate(config.padding_px, config.padding_px),
                    ..link
                })
                .collect(),
        })
        .collect();

    Ok(ExportDocument {
        file_name: export_file_name(full_name),
        pages,
    })
}

/// `Ada Lovelace` → `ada-lovelace-resume.pdf`; blank names give `resume.pdf`.
pub fn export_file_name(full_name: &str) -> String {
    let slug = full_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{slug}-resume.pdf")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

/// Allows one export at a time; the caller disables its download control
/// while `is_busy` is true.
#[derive(Debug, Default)]
pub struct ExportController {
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn export<S: PdfSink + ?Sized>(
        &self,
        sink: &S,
        document: &ExportDocument,
    ) -> Result<PdfArtifact, ExportError> {
        if document.pages.is_empty() {
            return Err(ExportError::Empty);
        }
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(ExportError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let result = sink.assemble(document).await;
        match &result {
            Ok(artifact) => info!(
                file = %artifact.file_name,
                pages = document.pages.len(),
                bytes = artifact.bytes.len(),
                "export complete"
            ),
            Err(err) => warn!(error = %err, "export failed"),
        }
        result
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
