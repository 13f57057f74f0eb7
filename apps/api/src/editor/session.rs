//! Editor session: decides *when* the live engine runs.
//!
//! Everything here is single-threaded and cooperative. Edits never repaginate
//! directly: they schedule one frame callback, and a newer edit cancels the
//! pending frame and requests another (cancel-and-reschedule). Mutations the
//! engine produces itself are filtered out by `ReflowGate`. The committed
//! snapshot is refreshed after every clean pass but only handed to the commit
//! callback on blur.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::export::{build_export_document, ExportDocument, ExportError};
use crate::layout::page_config::LayoutConfig;
use crate::layout::reflow::{repaginate, ReflowReport};
use crate::layout::tree::PageTree;

pub const MIN_ZOOM_PERCENT: u16 = 25;
pub const MAX_ZOOM_PERCENT: u16 = 400;

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(pub u64);

/// Host frame clock (`requestAnimationFrame` / `cancelAnimationFrame`).
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Debug, Default)]
struct GateState {
    repaginating: Cell<bool>,
    requested: Cell<bool>,
}

/// Shared "is currently repaginating" flag plus a pending-request bit.
///
/// Mutation observers call `request`; it is a no-op while a pass holds the
/// gate, so the engine's own moves never schedule another pass.
#[derive(Debug, Clone, Default)]
pub struct ReflowGate(Rc<GateState>);

impl ReflowGate {
    pub fn is_repaginating(&self) -> bool {
        self.0.repaginating.get()
    }

    /// Returns false when suppressed.
    pub fn request(&self) -> bool {
        if self.is_repaginating() {
            return false;
        }
        self.0.requested.set(true);
        true
    }

    pub fn take_request(&self) -> bool {
        self.0.requested.replace(false)
    }

    fn hold(&self) -> GateHold<'_> {
        self.0.repaginating.set(true);
        GateHold(self)
    }
}

struct GateHold<'a>(&'a ReflowGate);

impl Drop for GateHold<'_> {
    fn drop(&mut self) {
        self.0 .0.repaginating.set(false);
    }
}

type CommitFn = Box<dyn FnMut(String)>;

pub struct EditorSession<T: PageTree, S: FrameScheduler> {
    tree: T,
    scheduler: S,
    config: LayoutConfig,
    gate: ReflowGate,
    pending: Option<FrameId>,
    /// Markup captured after the last clean pass.
    committed: String,
    /// Markup last given to `on_commit`.
    handed_off: String,
    on_commit: CommitFn,
    page_count: usize,
    zoom_percent: u16,
}

impl<T: PageTree, S: FrameScheduler> EditorSession<T, S> {
    pub fn new(
        tree: T,
        scheduler: S,
        config: LayoutConfig,
        on_commit: impl FnMut(String) + 'static,
    ) -> Self {
        let committed = tree.snapshot_markup();
        let page_count = tree.pages().len();
        Self {
            tree,
            scheduler,
            config,
            gate: ReflowGate::default(),
            pending: None,
            handed_off: committed.clone(),
            committed,
            on_commit: Box::new(on_commit),
            page_count,
            zoom_percent: 100,
        }
    }

    /// Gate to hand to the surface's mutation observer.
    pub fn gate(&self) -> ReflowGate {
        self.gate.clone()
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Typed text, deletions and other edits on the surface.
    pub fn on_input(&mut self) {
        if self.gate.is_repaginating() {
            return;
        }
        self.schedule();
    }

    /// Drains a request raised through the gate by the mutation observer.
    pub fn on_mutations(&mut self) {
        if self.gate.take_request() {
            self.schedule();
        }
    }

    /// Frame callback. Stale frame ids are ignored.
    pub fn on_frame(&mut self, id: FrameId) -> Option<ReflowReport> {
        if self.pending != Some(id) {
            debug!(frame = id.0, "ignoring stale frame");
            return None;
        }
        self.pending = None;
        Some(self.run_pass())
    }

    /// Flushes a pending pass, then commits if the snapshot changed since the
    /// last hand-off.
    pub fn on_blur(&mut self) {
        if let Some(id) = self.pending {
            self.scheduler.cancel_frame(id);
            self.pending = None;
            self.run_pass();
        }
        if self.committed != self.handed_off {
            self.handed_off = self.committed.clone();
            (self.on_commit)(self.committed.clone());
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    pub fn set_zoom(&mut self, percent: u16) -> u16 {
        self.zoom_percent = percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);
        self.zoom_percent
    }

    pub fn status_text(&self) -> String {
        let pages = match self.page_count {
            1 => "1 page".to_string(),
            n => format!("{n} pages"),
        };
        format!("{pages} · {}%", self.zoom_percent)
    }

    pub fn export_document(&self, full_name: &str) -> Result<ExportDocument, ExportError> {
        build_export_document(&self.tree, &self.config, full_name)
    }

    fn schedule(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        self.pending = Some(self.scheduler.request_frame());
    }

    fn run_pass(&mut self) -> ReflowReport {
        let report = {
            let _hold = self.gate.hold();
            repaginate(&mut self.tree, &self.config)
        };
        self.page_count = report.page_count;
        if report.aborted.is_none() {
            self.committed = self.tree.snapshot_markup();
        }
        report
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::layout::mem_tree::{
        ColumnSnapshot, MemTree, PageSnapshot, SectionSnapshot, TreeSnapshot,
    };
    use crate::resume::{LayoutMode, SectionId};

    #[derive(Debug, Default)]
    struct FakeFrames {
        next: u64,
        requested: Vec<FrameId>,
        cancelled: Vec<FrameId>,
    }

    impl FrameScheduler for FakeFrames {
        fn request_frame(&mut self) -> FrameId {
            self.next += 1;
            let id = FrameId(self.next);
            self.requested.push(id);
            id
        }

        fn cancel_frame(&mut self, id: FrameId) {
            self.cancelled.push(id);
        }
    }

    type Commits = Rc<RefCell<Vec<String>>>;

    fn make_session() -> (EditorSession<MemTree, FakeFrames>, Commits) {
        let sections = vec![
            SectionSnapshot {
                id: SectionId::Experience,
                height: 300.0,
                markup: "<section>EXP</section>".to_string(),
                links: vec![],
            },
            SectionSnapshot {
                id: SectionId::Skills,
                height: 300.0,
                markup: "<section>SKL</section>".to_string(),
                links: vec![],
            },
        ];
        let tree = MemTree::from_snapshot(
            &TreeSnapshot {
                pages: vec![PageSnapshot {
                    layout: LayoutMode::Single,
                    content_height: 1004.0,
                    side_width: 0.0,
                    label: None,
                    main: ColumnSnapshot {
                        sections,
                        ..Default::default()
                    },
                    side: None,
                }],
            },
            24.0,
        );
        let commits: Commits = Rc::default();
        let sink = Rc::clone(&commits);
        let mut session = EditorSession::new(
            tree,
            FakeFrames::default(),
            LayoutConfig::default(),
            move |markup| sink.borrow_mut().push(markup),
        );
        let gate = session.gate();
        session.tree_mut().set_observer(move |_| {
            gate.request();
        });
        (session, commits)
    }

    fn grow(session: &mut EditorSession<MemTree, FakeFrames>, id: SectionId, height: f32) {
        let node = session.tree().find_section(id).unwrap();
        session.tree_mut().set_section_height(node, height).unwrap();
    }

    fn last_frame(session: &EditorSession<MemTree, FakeFrames>) -> FrameId {
        *session.scheduler().requested.last().unwrap()
    }

    #[test]
    fn test_rapid_input_coalesces_into_one_pass() {
        let (mut session, _) = make_session();
        session.on_input();
        session.on_input();
        session.on_input();

        assert_eq!(session.scheduler().requested.len(), 3);
        assert_eq!(
            session.scheduler().cancelled,
            vec![FrameId(1), FrameId(2)]
        );
        assert!(session.on_frame(FrameId(1)).is_none(), "cancelled frame is stale");
        assert!(session.on_frame(FrameId(3)).is_some());
        assert!(session.on_frame(FrameId(3)).is_none(), "runs once");
    }

    #[test]
    fn test_engine_mutations_do_not_retrigger() {
        let (mut session, _) = make_session();
        grow(&mut session, SectionId::Skills, 900.0);
        session.on_mutations();
        let frame = last_frame(&session);

        let report = session.on_frame(frame).unwrap();
        assert_eq!(report.pushed, 1);

        session.on_mutations();
        assert!(!session.has_pending_frame());
        assert!(!session.gate().is_repaginating());
    }

    #[test]
    fn test_user_mutation_schedules_a_frame() {
        let (mut session, _) = make_session();
        grow(&mut session, SectionId::Experience, 350.0);
        assert!(!session.has_pending_frame());
        session.on_mutations();
        assert!(session.has_pending_frame());
    }

    #[test]
    fn test_blur_commits_once_per_change() {
        let (mut session, commits) = make_session();
        grow(&mut session, SectionId::Skills, 900.0);
        session.on_mutations();
        let frame = last_frame(&session);
        session.on_frame(frame);
        assert!(commits.borrow().is_empty(), "no commit before blur");

        session.on_blur();
        session.on_blur();

        let commits = commits.borrow();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].contains("Page 2"));
        assert_eq!(commits[0].matches("page-gap").count(), 1);
    }

    #[test]
    fn test_blur_flushes_pending_frame() {
        let (mut session, commits) = make_session();
        grow(&mut session, SectionId::Skills, 900.0);
        session.on_input();

        session.on_blur();

        assert!(!session.has_pending_frame());
        assert_eq!(session.page_count(), 2);
        assert_eq!(commits.borrow().len(), 1);
    }

    #[test]
    fn test_blur_without_changes_does_not_commit() {
        let (mut session, commits) = make_session();
        session.on_blur();
        assert!(commits.borrow().is_empty());
    }

    #[test]
    fn test_status_text_tracks_pages_and_zoom() {
        let (mut session, _) = make_session();
        assert_eq!(session.status_text(), "1 page · 100%");

        grow(&mut session, SectionId::Skills, 900.0);
        session.on_input();
        let frame = last_frame(&session);
        session.on_frame(frame);
        assert_eq!(session.set_zoom(1000), 400);
        assert_eq!(session.status_text(), "2 pages · 400%");
        assert_eq!(session.set_zoom(5), 25);
    }

    #[test]
    fn test_export_document_reads_current_pages() {
        let (mut session, _) = make_session();
        grow(&mut session, SectionId::Skills, 900.0);
        session.on_input();
        let frame = last_frame(&session);
        session.on_frame(frame);

        let doc = session.export_document("Ada").unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.file_name, "ada-resume.pdf");
    }
}
