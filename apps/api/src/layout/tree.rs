//! Capability interface over a live, measurable page tree.
//!
//! The live engine treats the rendered tree itself as the data model: pages
//! hold columns, columns hold section nodes, and every node has a measurable
//! box. Implementations wrap a real rendering surface (browser DOM) or the
//! in-memory `MemTree` used by tests and the reflow endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resume::{ColumnKind, LayoutMode, SectionId};

/// Where a moved node lands among its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
}

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn translate(self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// A hyperlink and its bounding box, so exporters can overlay clickable regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRegion {
    pub href: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("node {0} is not attached to the document")]
    Detached(String),

    #[error("node {node} cannot be placed under {parent}")]
    InvalidParent { node: String, parent: String },
}

/// Mutable, measurable page → column → section tree.
///
/// Measurements are relative to the page's content box top. Mutations follow
/// DOM semantics: moving a node detaches it from its old parent first.
pub trait PageTree {
    type Node: Copy + Eq + fmt::Debug;
    /// Opaque caret/selection position captured before mutation.
    type Selection;

    /// Attached pages in document order.
    fn pages(&self) -> Vec<Self::Node>;
    fn layout_mode(&self, page: Self::Node) -> LayoutMode;
    fn column(&self, page: Self::Node, kind: ColumnKind) -> Option<Self::Node>;
    /// Section nodes of a column in document order.
    fn sections(&self, column: Self::Node) -> Vec<Self::Node>;
    fn section_id(&self, section: Self::Node) -> Option<SectionId>;

    /// Rendered height of any node.
    fn height(&self, node: Self::Node) -> f32;
    /// Bottom edge of the rendered content in a column.
    fn content_bottom(&self, column: Self::Node) -> f32;
    /// Bottom edge of the page body's content box.
    fn content_box_bottom(&self, page: Self::Node) -> f32;

    fn gap_after(&self, page: Self::Node) -> Option<Self::Node>;
    fn gap_before(&self, page: Self::Node) -> Option<Self::Node>;

    fn move_node_to(
        &mut self,
        node: Self::Node,
        parent: Self::Node,
        position: Position,
    ) -> Result<(), TreeError>;
    /// Detached copy of `page`: same layout mode, header/contact stripped, no sections.
    fn clone_as_template(&mut self, page: Self::Node) -> Result<Self::Node, TreeError>;
    fn create_gap_marker(&mut self) -> Self::Node;
    /// Attaches a detached page or gap marker right after `anchor`.
    fn insert_after(&mut self, node: Self::Node, anchor: Self::Node) -> Result<(), TreeError>;
    fn remove(&mut self, node: Self::Node) -> Result<(), TreeError>;
    fn set_label(&mut self, page: Self::Node, label: Option<String>) -> Result<(), TreeError>;

    /// Captures the caret only if its anchor lives inside the editable surface.
    fn capture_selection(&self) -> Option<Self::Selection>;
    fn is_attached(&self, selection: &Self::Selection) -> bool;
    fn restore_selection(&mut self, selection: Self::Selection);

    /// Markup of a single page.
    fn page_markup(&self, page: Self::Node) -> String;
    /// Markup of the whole paginated document, gap markers included.
    fn snapshot_markup(&self) -> String;
    /// Hyperlinks on a page with page-content-relative boxes.
    fn link_regions(&self, page: Self::Node) -> Vec<LinkRegion>;
}
