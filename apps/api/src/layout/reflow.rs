//! Live Repagination Engine: rebalances sections across already-rendered pages.
//!
//! # Architecture
//! The engine works on the rendered tree itself through the `PageTree`
//! capability interface; there is no separate document model. One call to
//! `repaginate` is one pass, run to convergence:
//!
//! 1. **Push**: while a column's content bottom extends past the page's usable
//!    bottom, move its last section to the front of the same column on the next
//!    page, creating that page (plus gap marker) from the first page's template.
//! 2. **Pull**: for each adjacent page pair, move the next page's first section
//!    to the end of the current page's column; undo and stop if that overflows.
//! 3. **Trim**: remove empty pages after the first, each with its preceding gap.
//! 4. **Relabel**: "Page N" labels, only when there is more than one page.
//!
//! Push and pull alternate until a round moves nothing (bounded by
//! `max_rounds`). Every inner loop is bounded by `max_iterations_per_page`, so a
//! section taller than a page yields a visibly overflowing page, never a hang.
//!
//! Malformed trees abort the pass: the tree keeps whatever progress was made
//! and the error is recorded in the report, never returned.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::page_config::LayoutConfig;
use crate::layout::tree::{PageTree, Position, TreeError};
use crate::resume::ColumnKind;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ReflowError {
    #[error("no pages in the document")]
    NoPages,

    #[error("page {page} has no {kind:?} column")]
    MissingColumn { page: usize, kind: ColumnKind },

    #[error("no template page available for a new page")]
    TemplateUnavailable,

    #[error("page tree error: {message}")]
    Tree { message: String },
}

impl From<TreeError> for ReflowError {
    fn from(err: TreeError) -> Self {
        ReflowError::Tree {
            message: err.to_string(),
        }
    }
}

/// What happened to the caret captured at the start of the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// The caret was not inside the editable surface.
    #[default]
    NotCaptured,
    Restored,
    /// The caret's node was replaced rather than moved; restore was skipped.
    Skipped,
}

/// Outcome of one repagination pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReflowReport {
    pub page_count: usize,
    pub pushed: usize,
    pub pulled: usize,
    pub pages_created: usize,
    pub pages_removed: usize,
    pub rounds: usize,
    /// Page indices whose iteration cap was hit.
    pub capped_pages: Vec<usize>,
    pub selection: SelectionOutcome,
    pub aborted: Option<ReflowError>,
}

impl ReflowReport {
    /// True when the pass moved, created or removed nothing.
    pub fn is_noop(&self) -> bool {
        self.pushed == 0 && self.pulled == 0 && self.pages_created == 0 && self.pages_removed == 0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Runs one repagination pass over `tree`.
pub fn repaginate<T: PageTree>(tree: &mut T, config: &LayoutConfig) -> ReflowReport {
    let mut report = ReflowReport::default();
    let selection = tree.capture_selection();

    if let Err(err) = run_pass(tree, config, &mut report) {
        warn!(error = %err, "repagination aborted, keeping partial layout");
        report.aborted = Some(err);
    }

    report.page_count = tree.pages().len();
    report.selection = restore_selection(tree, selection);

    debug!(
        pages = report.page_count,
        pushed = report.pushed,
        pulled = report.pulled,
        created = report.pages_created,
        removed = report.pages_removed,
        rounds = report.rounds,
        "repagination pass complete"
    );
    report
}

fn run_pass<T: PageTree>(
    tree: &mut T,
    config: &LayoutConfig,
    report: &mut ReflowReport,
) -> Result<(), ReflowError> {
    if tree.pages().is_empty() {
        return Err(ReflowError::NoPages);
    }

    for round in 1..=config.max_rounds.max(1) {
        report.rounds = round;
        let pushed = push_overflow(tree, config, report)?;
        let pulled = pull_back(tree, config, report)?;
        if pushed == 0 && pulled == 0 {
            break;
        }
        if round == config.max_rounds {
            warn!(rounds = round, "repagination did not settle within the round cap");
        }
    }

    trim_empty_pages(tree, report)?;
    relabel(tree)?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Phase A: push
// ────────────────────────────────────────────────────────────────────────────

fn push_overflow<T: PageTree>(
    tree: &mut T,
    config: &LayoutConfig,
    report: &mut ReflowReport,
) -> Result<usize, ReflowError> {
    let mut moved = 0;
    let mut index = 0;

    while index < tree.pages().len() {
        let mut iterations = 0;
        loop {
            // Moving a section may have created a page; always re-read.
            let pages = tree.pages();
            let page = pages[index];
            let Some((kind, section)) = next_push_candidate(tree, page, index, config)? else {
                break;
            };
            if iterations >= config.max_iterations_per_page {
                warn!(page = index, "push iteration cap hit, leaving page overflowing");
                report.capped_pages.push(index);
                break;
            }
            iterations += 1;

            let next = match pages.get(index + 1) {
                Some(&next) => next,
                None => append_page_after(tree, page, report)?,
            };
            let target = tree.column(next, kind).ok_or(ReflowError::MissingColumn {
                page: index + 1,
                kind,
            })?;
            tree.move_node_to(section, target, Position::First)?;
            moved += 1;
        }
        index += 1;
    }

    report.pushed += moved;
    Ok(moved)
}

/// The last section of the first overflowing column that may give one up.
/// Main is preferred over side when both overflow.
fn next_push_candidate<T: PageTree>(
    tree: &T,
    page: T::Node,
    index: usize,
    config: &LayoutConfig,
) -> Result<Option<(ColumnKind, T::Node)>, ReflowError> {
    for (kind, column) in page_columns(tree, page, index)? {
        if !overflows(tree, page, column, config) {
            continue;
        }
        let sections = tree.sections(column);
        let Some(&last) = sections.last() else {
            continue;
        };
        let keeps_last = index > 0 || !config.drain_first_page;
        if sections.len() == 1 && keeps_last {
            continue;
        }
        return Ok(Some((kind, last)));
    }
    Ok(None)
}

/// Creates an empty page from the first page's template right after `page`,
/// behind a gap marker.
fn append_page_after<T: PageTree>(
    tree: &mut T,
    page: T::Node,
    report: &mut ReflowReport,
) -> Result<T::Node, ReflowError> {
    let template = *tree
        .pages()
        .first()
        .ok_or(ReflowError::TemplateUnavailable)?;
    let new_page = tree
        .clone_as_template(template)
        .map_err(|_| ReflowError::TemplateUnavailable)?;

    let anchor = match tree.gap_after(page) {
        Some(gap) => gap,
        None => {
            let gap = tree.create_gap_marker();
            tree.insert_after(gap, page)?;
            gap
        }
    };
    tree.insert_after(new_page, anchor)?;
    report.pages_created += 1;
    Ok(new_page)
}

// ────────────────────────────────────────────────────────────────────────────
// Phase B: pull
// ────────────────────────────────────────────────────────────────────────────

fn pull_back<T: PageTree>(
    tree: &mut T,
    config: &LayoutConfig,
    report: &mut ReflowReport,
) -> Result<usize, ReflowError> {
    let mut moved = 0;
    let mut index = 0;

    while index + 1 < tree.pages().len() {
        let pages = tree.pages();
        let (current, next) = (pages[index], pages[index + 1]);
        let mut open: Vec<ColumnKind> = tree.layout_mode(current).columns().to_vec();
        let mut iterations = 0;

        while !open.is_empty() {
            if iterations >= config.max_iterations_per_page {
                warn!(page = index, "pull iteration cap hit");
                report.capped_pages.push(index);
                break;
            }
            iterations += 1;

            let mut still_open = Vec::with_capacity(open.len());
            for kind in open {
                if pull_one(tree, (current, next), index, kind, config)? {
                    moved += 1;
                    still_open.push(kind);
                }
            }
            open = still_open;
        }
        index += 1;
    }

    report.pulled += moved;
    Ok(moved)
}

/// Pulls the first section of `kind` on the next page to the end of the
/// current page. Returns false (with the move undone) if it does not fit.
fn pull_one<T: PageTree>(
    tree: &mut T,
    (current, next): (T::Node, T::Node),
    index: usize,
    kind: ColumnKind,
    config: &LayoutConfig,
) -> Result<bool, ReflowError> {
    let to = tree
        .column(current, kind)
        .ok_or(ReflowError::MissingColumn { page: index, kind })?;
    let from = tree.column(next, kind).ok_or(ReflowError::MissingColumn {
        page: index + 1,
        kind,
    })?;
    let Some(&first) = tree.sections(from).first() else {
        return Ok(false);
    };

    tree.move_node_to(first, to, Position::Last)?;
    if overflows(tree, current, to, config) {
        tree.move_node_to(first, from, Position::First)?;
        return Ok(false);
    }
    Ok(true)
}

// ────────────────────────────────────────────────────────────────────────────
// Phases C and D: trim and relabel
// ────────────────────────────────────────────────────────────────────────────

/// Removes every empty page after the first, scanning backward.
fn trim_empty_pages<T: PageTree>(
    tree: &mut T,
    report: &mut ReflowReport,
) -> Result<(), ReflowError> {
    let pages = tree.pages();
    for &page in pages.iter().skip(1).rev() {
        if !page_is_empty(tree, page) {
            continue;
        }
        if let Some(gap) = tree.gap_before(page) {
            tree.remove(gap)?;
        }
        tree.remove(page)?;
        report.pages_removed += 1;
    }
    Ok(())
}

fn relabel<T: PageTree>(tree: &mut T) -> Result<(), ReflowError> {
    let pages = tree.pages();
    let numbered = pages.len() > 1;
    for (index, page) in pages.into_iter().enumerate() {
        let label = numbered.then(|| format!("Page {}", index + 1));
        tree.set_label(page, label)?;
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Columns of `page` for its layout mode, main first.
fn page_columns<T: PageTree>(
    tree: &T,
    page: T::Node,
    index: usize,
) -> Result<Vec<(ColumnKind, T::Node)>, ReflowError> {
    tree.layout_mode(page)
        .columns()
        .iter()
        .map(|&kind| {
            tree.column(page, kind)
                .map(|column| (kind, column))
                .ok_or(ReflowError::MissingColumn { page: index, kind })
        })
        .collect()
}

fn overflows<T: PageTree>(tree: &T, page: T::Node, column: T::Node, config: &LayoutConfig) -> bool {
    let usable_bottom = tree.content_box_bottom(page) - config.reflow_bottom_reserve_px;
    tree.content_bottom(column) - usable_bottom > config.overflow_tolerance_px
}

fn page_is_empty<T: PageTree>(tree: &T, page: T::Node) -> bool {
    [ColumnKind::Main, ColumnKind::Side]
        .into_iter()
        .filter_map(|kind| tree.column(page, kind))
        .all(|column| tree.sections(column).is_empty())
}

fn restore_selection<T: PageTree>(tree: &mut T, token: Option<T::Selection>) -> SelectionOutcome {
    match token {
        None => SelectionOutcome::NotCaptured,
        Some(token) if tree.is_attached(&token) => {
            tree.restore_selection(token);
            SelectionOutcome::Restored
        }
        Some(_) => {
            debug!("caret anchor detached during repagination, not restoring");
            SelectionOutcome::Skipped
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
