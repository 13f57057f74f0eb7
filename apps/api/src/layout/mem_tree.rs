//! In-memory measured page tree.
//!
//! An arena of page, column, section and gap-marker nodes with explicit heights.
//! It behaves like the rendered DOM as far as the reflow engine can observe:
//! moving a node that holds the caret drops the selection, cloned pages are
//! detached until inserted, and replaced nodes stop being attached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::tree::{LinkRegion, PageTree, Position, TreeError};
use crate::render::escape::escape_html;
use crate::resume::{ColumnKind, LayoutMode, SectionId};

const GAP_MARKUP: &str = "<div class=\"page-gap\" aria-hidden=\"true\"></div>";

// ────────────────────────────────────────────────────────────────────────────
// Serializable snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Measured section as exchanged with the editor surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub id: SectionId,
    pub height: f32,
    #[serde(default)]
    pub markup: String,
    /// Links with section-relative boxes.
    #[serde(default)]
    pub links: Vec<LinkRegion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    /// Height taken by the header block or contact card above the sections.
    #[serde(default)]
    pub top_offset: f32,
    #[serde(default)]
    pub lead_markup: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub layout: LayoutMode,
    /// Bottom of the body content box, relative to its top.
    pub content_height: f32,
    /// Width of the side column; main-column links are offset by it.
    #[serde(default)]
    pub side_width: f32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub main: ColumnSnapshot,
    #[serde(default)]
    pub side: Option<ColumnSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub pages: Vec<PageSnapshot>,
}

/// Section ids placed on one page, per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSections {
    pub main: Vec<SectionId>,
    pub side: Vec<SectionId>,
    pub label: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Arena
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Caret position: a text offset inside a section node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

/// Structural change notification, delivered to the mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Moved(NodeId),
    Inserted(NodeId),
    Removed(NodeId),
    Relabeled(NodeId),
    Resized(NodeId),
}

#[derive(Debug, Clone)]
struct PageData {
    mode: LayoutMode,
    content_height: f32,
    side_width: f32,
    label: Option<String>,
    main: NodeId,
    side: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct ColumnData {
    kind: ColumnKind,
    top_offset: f32,
    lead_markup: Option<String>,
    sections: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct SectionData {
    id: SectionId,
    height: f32,
    markup: String,
    links: Vec<LinkRegion>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Page(PageData),
    Column(ColumnData),
    Section(SectionData),
    Gap,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionState {
    Empty,
    InSurface(Caret),
    Outside,
}

type Observer = Box<dyn FnMut(&Mutation)>;

pub struct MemTree {
    nodes: Vec<Node>,
    /// Top-level document order: pages and gap markers.
    body: Vec<NodeId>,
    selection: SelectionState,
    gap_height: f32,
    observer: Option<Observer>,
}

impl fmt::Debug for MemTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemTree")
            .field("pages", &self.page_sections())
            .field("gaps", &self.gap_count())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl MemTree {
    pub fn new(gap_height: f32) -> Self {
        Self {
            nodes: Vec::new(),
            body: Vec::new(),
            selection: SelectionState::Empty,
            gap_height,
            observer: None,
        }
    }

    /// Builds a tree with a gap marker between consecutive pages.
    pub fn from_snapshot(snapshot: &TreeSnapshot, gap_height: f32) -> Self {
        let mut tree = Self::new(gap_height);
        for page in &snapshot.pages {
            tree.push_page(page);
        }
        tree
    }

    pub fn to_snapshot(&self) -> TreeSnapshot {
        let pages = self
            .pages()
            .into_iter()
            .filter_map(|page| {
                let data = self.page_data(page)?;
                Some(PageSnapshot {
                    layout: data.mode,
                    content_height: data.content_height,
                    side_width: data.side_width,
                    label: data.label.clone(),
                    main: self.column_snapshot(data.main),
                    side: data.side.map(|side| self.column_snapshot(side)),
                })
            })
            .collect();
        TreeSnapshot { pages }
    }

    /// Appends a page (preceded by a gap marker unless it is the first).
    ///
    /// A two-column page without a side column gets an empty one; side
    /// sections given to a single-column page are appended to its body.
    pub fn push_page(&mut self, snapshot: &PageSnapshot) -> NodeId {
        if !self.body.is_empty() {
            let gap = self.alloc(NodeKind::Gap, None);
            self.body.push(gap);
        }

        let main = self.alloc_column(ColumnKind::Main, &snapshot.main);
        let side = match snapshot.layout {
            LayoutMode::Two => {
                let side_snapshot = snapshot.side.clone().unwrap_or_default();
                Some(self.alloc_column(ColumnKind::Side, &side_snapshot))
            }
            LayoutMode::Single => {
                if let Some(extra) = &snapshot.side {
                    for section in &extra.sections {
                        self.alloc_section(main, section);
                    }
                }
                None
            }
        };

        let page = self.alloc(
            NodeKind::Page(PageData {
                mode: snapshot.layout,
                content_height: snapshot.content_height,
                side_width: snapshot.side_width,
                label: snapshot.label.clone(),
                main,
                side,
            }),
            None,
        );
        self.nodes[main.0].parent = Some(page);
        if let Some(side) = side {
            self.nodes[side.0].parent = Some(page);
        }
        self.body.push(page);
        page
    }

    /// Section ids per attached page, in document order.
    pub fn page_sections(&self) -> Vec<PageSections> {
        self.pages()
            .into_iter()
            .filter_map(|page| {
                let data = self.page_data(page)?;
                Some(PageSections {
                    main: self.column_ids(Some(data.main)),
                    side: self.column_ids(data.side),
                    label: data.label.clone(),
                })
            })
            .collect()
    }

    pub fn gap_count(&self) -> usize {
        self.body
            .iter()
            .filter(|id| matches!(self.nodes[id.0].kind, NodeKind::Gap))
            .count()
    }

    /// Finds the attached section node rendering `id`.
    pub fn find_section(&self, id: SectionId) -> Option<NodeId> {
        (0..self.nodes.len()).map(NodeId).find(|&node| {
            self.is_node_attached(node)
                && matches!(&self.nodes[node.0].kind, NodeKind::Section(s) if s.id == id)
        })
    }

    /// Simulates an edit that changes a section's rendered height.
    pub fn set_section_height(&mut self, section: NodeId, height: f32) -> Result<(), TreeError> {
        match self.nodes.get_mut(section.0).map(|n| &mut n.kind) {
            Some(NodeKind::Section(data)) => data.height = height.max(0.0),
            _ => return Err(TreeError::UnknownNode(format!("{section:?}"))),
        }
        self.notify(Mutation::Resized(section));
        Ok(())
    }

    /// Replaces a section with a structural copy in the same position. The
    /// original node is left detached.
    pub fn replace_section(&mut self, section: NodeId) -> Result<NodeId, TreeError> {
        let (data, parent) = match self.nodes.get(section.0) {
            Some(Node {
                kind: NodeKind::Section(data),
                parent: Some(parent),
            }) => (data.clone(), *parent),
            Some(_) => return Err(TreeError::Detached(format!("{section:?}"))),
            None => return Err(TreeError::UnknownNode(format!("{section:?}"))),
        };
        let copy = self.alloc(NodeKind::Section(data), Some(parent));
        if let NodeKind::Column(column) = &mut self.nodes[parent.0].kind {
            if let Some(slot) = column.sections.iter_mut().find(|s| **s == section) {
                *slot = copy;
            }
        }
        self.nodes[section.0].parent = None;
        self.notify(Mutation::Inserted(copy));
        Ok(copy)
    }

    pub fn place_caret(&mut self, node: NodeId, offset: usize) {
        self.selection = SelectionState::InSurface(Caret { node, offset });
    }

    /// Puts the caret somewhere outside the editable surface (e.g. a toolbar input).
    pub fn place_caret_outside(&mut self) {
        self.selection = SelectionState::Outside;
    }

    pub fn caret(&self) -> Option<Caret> {
        match self.selection {
            SelectionState::InSurface(caret) => Some(caret),
            _ => None,
        }
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&Mutation) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { kind, parent });
        NodeId(self.nodes.len() - 1)
    }

    fn alloc_column(&mut self, kind: ColumnKind, snapshot: &ColumnSnapshot) -> NodeId {
        let column = self.alloc(
            NodeKind::Column(ColumnData {
                kind,
                top_offset: snapshot.top_offset.max(0.0),
                lead_markup: snapshot.lead_markup.clone(),
                sections: Vec::new(),
            }),
            None,
        );
        for section in &snapshot.sections {
            self.alloc_section(column, section);
        }
        column
    }

    fn alloc_section(&mut self, column: NodeId, snapshot: &SectionSnapshot) -> NodeId {
        let section = self.alloc(
            NodeKind::Section(SectionData {
                id: snapshot.id,
                height: snapshot.height.max(0.0),
                markup: snapshot.markup.clone(),
                links: snapshot.links.clone(),
            }),
            Some(column),
        );
        if let NodeKind::Column(data) = &mut self.nodes[column.0].kind {
            data.sections.push(section);
        }
        section
    }

    fn notify(&mut self, mutation: Mutation) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&mutation);
        }
    }

    fn page_data(&self, page: NodeId) -> Option<&PageData> {
        match &self.nodes.get(page.0)?.kind {
            NodeKind::Page(data) => Some(data),
            _ => None,
        }
    }

    fn column_data(&self, column: NodeId) -> Option<&ColumnData> {
        match &self.nodes.get(column.0)?.kind {
            NodeKind::Column(data) => Some(data),
            _ => None,
        }
    }

    fn section_data(&self, section: NodeId) -> Option<&SectionData> {
        match &self.nodes.get(section.0)?.kind {
            NodeKind::Section(data) => Some(data),
            _ => None,
        }
    }

    fn column_ids(&self, column: Option<NodeId>) -> Vec<SectionId> {
        column
            .and_then(|c| self.column_data(c))
            .map(|c| {
                c.sections
                    .iter()
                    .filter_map(|s| self.section_data(*s).map(|d| d.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn column_snapshot(&self, column: NodeId) -> ColumnSnapshot {
        let Some(data) = self.column_data(column) else {
            return ColumnSnapshot::default();
        };
        ColumnSnapshot {
            top_offset: data.top_offset,
            lead_markup: data.lead_markup.clone(),
            sections: data
                .sections
                .iter()
                .filter_map(|s| self.section_data(*s))
                .map(|s| SectionSnapshot {
                    id: s.id,
                    height: s.height,
                    markup: s.markup.clone(),
                    links: s.links.clone(),
                })
                .collect(),
        }
    }

    fn sections_height(&self, column: &ColumnData) -> f32 {
        column
            .sections
            .iter()
            .filter_map(|s| self.section_data(*s))
            .map(|s| s.height)
            .sum()
    }

    fn is_node_attached(&self, node: NodeId) -> bool {
        let Some(entry) = self.nodes.get(node.0) else {
            return false;
        };
        match entry.kind {
            NodeKind::Page(_) | NodeKind::Gap => self.body.contains(&node),
            NodeKind::Column(_) | NodeKind::Section(_) => entry
                .parent
                .map(|parent| self.is_node_attached(parent))
                .unwrap_or(false),
        }
    }

    fn column_markup(&self, column: NodeId) -> String {
        let Some(data) = self.column_data(column) else {
            return String::new();
        };
        let mut out = data.lead_markup.clone().unwrap_or_default();
        for section in &data.sections {
            if let Some(s) = self.section_data(*section) {
                out.push_str(&s.markup);
            }
        }
        out
    }

    fn detach_from_column(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            if let NodeKind::Column(column) = &mut self.nodes[parent.0].kind {
                column.sections.retain(|s| *s != node);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capability interface
// ────────────────────────────────────────────────────────────────────────────

impl PageTree for MemTree {
    type Node = NodeId;
    type Selection = Caret;

    fn pages(&self) -> Vec<NodeId> {
        self.body
            .iter()
            .copied()
            .filter(|id| matches!(self.nodes[id.0].kind, NodeKind::Page(_)))
            .collect()
    }

    fn layout_mode(&self, page: NodeId) -> LayoutMode {
        self.page_data(page).map(|p| p.mode).unwrap_or_default()
    }

    fn column(&self, page: NodeId, kind: ColumnKind) -> Option<NodeId> {
        let data = self.page_data(page)?;
        match kind {
            ColumnKind::Main => Some(data.main),
            ColumnKind::Side => data.side,
        }
    }

    fn sections(&self, column: NodeId) -> Vec<NodeId> {
        self.column_data(column)
            .map(|c| c.sections.clone())
            .unwrap_or_default()
    }

    fn section_id(&self, section: NodeId) -> Option<SectionId> {
        self.section_data(section).map(|s| s.id)
    }

    fn height(&self, node: NodeId) -> f32 {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Section(s)) => s.height,
            Some(NodeKind::Column(c)) => c.top_offset + self.sections_height(c),
            Some(NodeKind::Page(p)) => p.content_height,
            Some(NodeKind::Gap) => self.gap_height,
            None => 0.0,
        }
    }

    fn content_bottom(&self, column: NodeId) -> f32 {
        self.column_data(column)
            .map(|c| c.top_offset + self.sections_height(c))
            .unwrap_or(0.0)
    }

    fn content_box_bottom(&self, page: NodeId) -> f32 {
        self.page_data(page).map(|p| p.content_height).unwrap_or(0.0)
    }

    fn gap_after(&self, page: NodeId) -> Option<NodeId> {
        let index = self.body.iter().position(|id| *id == page)?;
        let next = *self.body.get(index + 1)?;
        matches!(self.nodes[next.0].kind, NodeKind::Gap).then_some(next)
    }

    fn gap_before(&self, page: NodeId) -> Option<NodeId> {
        let index = self.body.iter().position(|id| *id == page)?;
        let prev = *self.body.get(index.checked_sub(1)?)?;
        matches!(self.nodes[prev.0].kind, NodeKind::Gap).then_some(prev)
    }

    fn move_node_to(
        &mut self,
        node: NodeId,
        parent: NodeId,
        position: Position,
    ) -> Result<(), TreeError> {
        let movable = matches!(
            self.nodes.get(node.0).map(|n| &n.kind),
            Some(NodeKind::Section(_))
        );
        let accepts = self.column_data(parent).is_some();
        if !movable || !accepts {
            return Err(TreeError::InvalidParent {
                node: format!("{node:?}"),
                parent: format!("{parent:?}"),
            });
        }

        self.detach_from_column(node);
        if let NodeKind::Column(column) = &mut self.nodes[parent.0].kind {
            match position {
                Position::First => column.sections.insert(0, node),
                Position::Last => column.sections.push(node),
            }
        }
        self.nodes[node.0].parent = Some(parent);

        // A browser collapses the selection when its anchor node is moved.
        if matches!(self.selection, SelectionState::InSurface(c) if c.node == node) {
            self.selection = SelectionState::Empty;
        }
        self.notify(Mutation::Moved(node));
        Ok(())
    }

    fn clone_as_template(&mut self, page: NodeId) -> Result<NodeId, TreeError> {
        let data = self
            .page_data(page)
            .cloned()
            .ok_or_else(|| TreeError::UnknownNode(format!("{page:?}")))?;
        let empty = ColumnSnapshot::default();
        let main = self.alloc_column(ColumnKind::Main, &empty);
        let side = data
            .side
            .map(|_| self.alloc_column(ColumnKind::Side, &empty));
        let clone = self.alloc(
            NodeKind::Page(PageData {
                label: None,
                main,
                side,
                ..data
            }),
            None,
        );
        self.nodes[main.0].parent = Some(clone);
        if let Some(side) = side {
            self.nodes[side.0].parent = Some(clone);
        }
        Ok(clone)
    }

    fn create_gap_marker(&mut self) -> NodeId {
        self.alloc(NodeKind::Gap, None)
    }

    fn insert_after(&mut self, node: NodeId, anchor: NodeId) -> Result<(), TreeError> {
        let top_level = matches!(
            self.nodes.get(node.0).map(|n| &n.kind),
            Some(NodeKind::Page(_) | NodeKind::Gap)
        );
        if !top_level || self.body.contains(&node) {
            return Err(TreeError::InvalidParent {
                node: format!("{node:?}"),
                parent: "document".to_string(),
            });
        }
        let index = self
            .body
            .iter()
            .position(|id| *id == anchor)
            .ok_or_else(|| TreeError::Detached(format!("{anchor:?}")))?;
        self.body.insert(index + 1, node);
        self.notify(Mutation::Inserted(node));
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), TreeError> {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Page(_) | NodeKind::Gap) => {
                let index = self
                    .body
                    .iter()
                    .position(|id| *id == node)
                    .ok_or_else(|| TreeError::Detached(format!("{node:?}")))?;
                self.body.remove(index);
            }
            Some(NodeKind::Section(_)) => self.detach_from_column(node),
            Some(NodeKind::Column(_)) => {
                return Err(TreeError::InvalidParent {
                    node: format!("{node:?}"),
                    parent: "page".to_string(),
                })
            }
            None => return Err(TreeError::UnknownNode(format!("{node:?}"))),
        }
        self.notify(Mutation::Removed(node));
        Ok(())
    }

    fn set_label(&mut self, page: NodeId, label: Option<String>) -> Result<(), TreeError> {
        match self.nodes.get_mut(page.0).map(|n| &mut n.kind) {
            Some(NodeKind::Page(data)) => {
                if data.label == label {
                    return Ok(());
                }
                data.label = label;
            }
            _ => return Err(TreeError::UnknownNode(format!("{page:?}"))),
        }
        self.notify(Mutation::Relabeled(page));
        Ok(())
    }

    fn capture_selection(&self) -> Option<Caret> {
        match self.selection {
            SelectionState::InSurface(caret) if self.is_node_attached(caret.node) => Some(caret),
            _ => None,
        }
    }

    fn is_attached(&self, selection: &Caret) -> bool {
        self.is_node_attached(selection.node)
    }

    fn restore_selection(&mut self, selection: Caret) {
        self.selection = SelectionState::InSurface(selection);
    }

    fn page_markup(&self, page: NodeId) -> String {
        let Some(data) = self.page_data(page) else {
            return String::new();
        };
        let index = self.pages().iter().position(|p| *p == page).unwrap_or(0);
        let mut out = format!(
            "<div class=\"resume-page\" data-page=\"{index}\" data-layout=\"{}\">",
            data.mode.as_str()
        );
        match data.side {
            None => {
                out.push_str("<div class=\"page-body\" data-column=\"main\">");
                out.push_str(&self.column_markup(data.main));
                out.push_str("</div>");
            }
            Some(side) => {
                out.push_str("<div class=\"page-columns\"><aside class=\"page-side\" data-column=\"side\">");
                out.push_str(&self.column_markup(side));
                out.push_str("</aside><main class=\"page-main\" data-column=\"main\">");
                out.push_str(&self.column_markup(data.main));
                out.push_str("</main></div>");
            }
        }
        if let Some(label) = &data.label {
            out.push_str(&format!(
                "<div class=\"page-label\">{}</div>",
                escape_html(label)
            ));
        }
        out.push_str("</div>");
        out
    }

    fn snapshot_markup(&self) -> String {
        self.body
            .iter()
            .map(|id| match self.nodes[id.0].kind {
                NodeKind::Gap => GAP_MARKUP.to_string(),
                _ => self.page_markup(*id),
            })
            .collect()
    }

    fn link_regions(&self, page: NodeId) -> Vec<LinkRegion> {
        let Some(data) = self.page_data(page) else {
            return Vec::new();
        };
        let main_x = if data.side.is_some() { data.side_width } else { 0.0 };
        let columns = [(Some(data.main), main_x), (data.side, 0.0)];

        let mut regions = Vec::new();
        for (column, x) in columns {
            let Some(column) = column.and_then(|c| self.column_data(c)) else {
                continue;
            };
            let mut y = column.top_offset;
            for section in column.sections.iter().filter_map(|s| self.section_data(*s)) {
                regions.extend(section.links.iter().map(|link| LinkRegion {
                    href: link.href.clone(),
                    rect: link.rect.translate(x, y),
                }));
                y += section.height;
            }
        }
        regions
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::Rect;

    fn section(id: SectionId, height: f32) -> SectionSnapshot {
        SectionSnapshot {
            id,
            height,
            markup: format!("<section>{id}</section>"),
            links: vec![],
        }
    }

    fn two_pages() -> MemTree {
        let page = |sections: Vec<SectionSnapshot>| PageSnapshot {
            layout: LayoutMode::Single,
            content_height: 1000.0,
            side_width: 0.0,
            label: None,
            main: ColumnSnapshot {
                sections,
                ..Default::default()
            },
            side: None,
        };
        MemTree::from_snapshot(
            &TreeSnapshot {
                pages: vec![
                    page(vec![section(SectionId::Experience, 700.0)]),
                    page(vec![section(SectionId::Skills, 500.0)]),
                ],
            },
            24.0,
        )
    }

    #[test]
    fn test_from_snapshot_inserts_gaps_between_pages() {
        let tree = two_pages();
        assert_eq!(tree.pages().len(), 2);
        assert_eq!(tree.gap_count(), 1);
        let pages = tree.pages();
        assert!(tree.gap_after(pages[0]).is_some());
        assert_eq!(tree.gap_after(pages[0]), tree.gap_before(pages[1]));
        assert!(tree.gap_before(pages[0]).is_none());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_layout() {
        let tree = two_pages();
        let again = MemTree::from_snapshot(&tree.to_snapshot(), 24.0);
        assert_eq!(tree.page_sections(), again.page_sections());
    }

    #[test]
    fn test_move_updates_columns_and_drops_caret() {
        let mut tree = two_pages();
        let pages = tree.pages();
        let skills = tree.find_section(SectionId::Skills).unwrap();
        tree.place_caret(skills, 3);
        let main0 = tree.column(pages[0], ColumnKind::Main).unwrap();

        tree.move_node_to(skills, main0, Position::Last).unwrap();

        assert_eq!(
            tree.page_sections()[0].main,
            vec![SectionId::Experience, SectionId::Skills]
        );
        assert!(tree.page_sections()[1].main.is_empty());
        assert_eq!(tree.content_bottom(main0), 1200.0);
        assert!(tree.caret().is_none(), "moving the anchor collapses the selection");
    }

    #[test]
    fn test_clone_as_template_is_detached_and_empty() {
        let mut tree = two_pages();
        let first = tree.pages()[0];
        let clone = tree.clone_as_template(first).unwrap();
        assert_eq!(tree.pages().len(), 2);
        let main = tree.column(clone, ColumnKind::Main).unwrap();
        assert!(tree.sections(main).is_empty());
        assert_eq!(tree.content_box_bottom(clone), 1000.0);
        assert_eq!(tree.content_bottom(main), 0.0);
    }

    #[test]
    fn test_replaced_section_is_no_longer_attached() {
        let mut tree = two_pages();
        let exp = tree.find_section(SectionId::Experience).unwrap();
        tree.place_caret(exp, 0);
        let caret = tree.capture_selection().unwrap();
        let copy = tree.replace_section(exp).unwrap();
        assert!(!tree.is_attached(&caret));
        assert_eq!(tree.find_section(SectionId::Experience), Some(copy));
    }

    #[test]
    fn test_caret_outside_surface_is_not_captured() {
        let mut tree = two_pages();
        tree.place_caret_outside();
        assert!(tree.capture_selection().is_none());
    }

    #[test]
    fn test_observer_sees_mutations() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tree = two_pages();
        let sink = Rc::clone(&seen);
        tree.set_observer(move |m| sink.borrow_mut().push(*m));
        let page = tree.pages()[1];
        tree.set_label(page, Some("Page 2".to_string())).unwrap();
        tree.set_label(page, Some("Page 2".to_string())).unwrap();
        assert_eq!(seen.borrow().as_slice(), &[Mutation::Relabeled(page)]);
    }

    #[test]
    fn test_link_regions_are_offset_by_column_and_section() {
        let link = LinkRegion {
            href: "https://example.com/".to_string(),
            rect: Rect {
                x: 10.0,
                y: 5.0,
                width: 80.0,
                height: 12.0,
            },
        };
        let snapshot = TreeSnapshot {
            pages: vec![PageSnapshot {
                layout: LayoutMode::Two,
                content_height: 1000.0,
                side_width: 220.0,
                label: None,
                main: ColumnSnapshot {
                    top_offset: 100.0,
                    lead_markup: None,
                    sections: vec![
                        section(SectionId::Experience, 300.0),
                        SectionSnapshot {
                            links: vec![link],
                            ..section(SectionId::Projects, 200.0)
                        },
                    ],
                },
                side: None,
            }],
        };
        let tree = MemTree::from_snapshot(&snapshot, 24.0);
        let regions = tree.link_regions(tree.pages()[0]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect.x, 230.0);
        assert_eq!(regions[0].rect.y, 405.0);
    }

    #[test]
    fn test_snapshot_markup_includes_gaps_and_labels() {
        let mut tree = two_pages();
        let pages = tree.pages();
        tree.set_label(pages[0], Some("Page 1".to_string())).unwrap();
        let markup = tree.snapshot_markup();
        assert_eq!(markup.matches("page-gap").count(), 1);
        assert!(markup.contains("<div class=\"page-label\">Page 1</div>"));
        assert!(markup.contains("<section>experience</section>"));
    }
}
