//! Measurement-Based Pre-Paginator: one-shot page partition from measured heights.
//!
//! Used for the read-only preview path and for initial sizing before the user
//! starts editing. Heights come from an actual render of every section in a
//! flat container, so first paint is already close to correctly paginated.
//!
//! # Algorithm
//! Walk the global order keeping a running height per column (main and side
//! tracked independently in two-column mode, one total in single-column mode).
//! Consecutive sections in the same column are separated by `section_gap_px`.
//! Before placing a section, if the projected height of the larger column
//! exceeds capacity and the page already holds a section, start a new page and
//! reset both totals. A section is always placed, even if it alone overflows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resume::{ColumnKind, LayoutMode, SectionId};

/// Ordered pages, each an ordered list of section ids.
pub type PagePartition = Vec<Vec<SectionId>>;

/// Inputs to the estimator besides the measurements themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrePaginateParams {
    pub mode: LayoutMode,
    pub capacity_px: f32,
    pub section_gap_px: f32,
    /// Height already occupied in the first page's main column (header block).
    #[serde(default)]
    pub first_page_main_offset_px: f32,
    /// Height already occupied in the first page's side column (contact card).
    #[serde(default)]
    pub first_page_side_offset_px: f32,
}

#[derive(Debug, Default)]
struct ColumnFill {
    height: f32,
    count: usize,
}

impl ColumnFill {
    fn projected(&self, section_height: f32, gap: f32) -> f32 {
        if self.count == 0 {
            self.height + section_height
        } else {
            self.height + gap + section_height
        }
    }
}

/// Partitions `order` into pages using measured section heights.
///
/// Sections without a measurement are skipped: they were not rendered, so
/// they have no content to place.
pub fn pre_paginate(
    order: &[SectionId],
    heights: &BTreeMap<SectionId, f32>,
    params: &PrePaginateParams,
) -> PagePartition {
    let mut pages: PagePartition = Vec::new();
    let mut current: Vec<SectionId> = Vec::new();
    let mut main = ColumnFill {
        height: params.first_page_main_offset_px.max(0.0),
        count: 0,
    };
    let mut side = ColumnFill {
        height: params.first_page_side_offset_px.max(0.0),
        count: 0,
    };

    for &id in order {
        let Some(&height) = heights.get(&id) else {
            debug!(section = %id, "pre-paginate: no measurement, skipping");
            continue;
        };
        let height = height.max(0.0);

        let kind = match params.mode {
            LayoutMode::Single => ColumnKind::Main,
            LayoutMode::Two => id.column(LayoutMode::Two),
        };

        let (target, other) = match kind {
            ColumnKind::Main => (&main, &side),
            ColumnKind::Side => (&side, &main),
        };
        let projected = target.projected(height, params.section_gap_px);
        let tallest = match params.mode {
            LayoutMode::Single => projected,
            LayoutMode::Two => projected.max(other.height),
        };

        if tallest > params.capacity_px && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            main = ColumnFill::default();
            side = ColumnFill::default();
        }

        let fill = match kind {
            ColumnKind::Main => &mut main,
            ColumnKind::Side => &mut side,
        };
        fill.height = fill.projected(height, params.section_gap_px);
        fill.count += 1;
        current.push(id);
    }

    if !current.is_empty() {
        pages.push(current);
    }

    debug!(pages = pages.len(), "pre-paginate complete");
    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: LayoutMode, capacity: f32) -> PrePaginateParams {
        PrePaginateParams {
            mode,
            capacity_px: capacity,
            section_gap_px: 0.0,
            first_page_main_offset_px: 0.0,
            first_page_side_offset_px: 0.0,
        }
    }

    fn heights(pairs: &[(SectionId, f32)]) -> BTreeMap<SectionId, f32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let order = [SectionId::Experience, SectionId::Skills];
        let h = heights(&[(SectionId::Experience, 700.0), (SectionId::Skills, 500.0)]);
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Single, 1000.0));
        assert_eq!(
            pages,
            vec![vec![SectionId::Experience], vec![SectionId::Skills]]
        );
    }

    #[test]
    fn test_everything_fits_on_one_page() {
        let order = [SectionId::Experience, SectionId::Skills];
        let h = heights(&[(SectionId::Experience, 200.0), (SectionId::Skills, 500.0)]);
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Single, 1000.0));
        assert_eq!(pages, vec![vec![SectionId::Experience, SectionId::Skills]]);
    }

    #[test]
    fn test_gap_counts_between_sections_in_same_column() {
        let order = [SectionId::Experience, SectionId::Education];
        let h = heights(&[(SectionId::Experience, 500.0), (SectionId::Education, 490.0)]);
        let mut p = params(LayoutMode::Single, 1000.0);
        p.section_gap_px = 16.0;
        let pages = pre_paginate(&order, &h, &p);
        assert_eq!(pages.len(), 2, "500 + 16 + 490 exceeds 1000");
    }

    #[test]
    fn test_oversized_section_is_still_placed() {
        let order = [SectionId::Experience, SectionId::Skills];
        let h = heights(&[(SectionId::Experience, 1500.0), (SectionId::Skills, 100.0)]);
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Single, 1000.0));
        assert_eq!(
            pages,
            vec![vec![SectionId::Experience], vec![SectionId::Skills]]
        );
    }

    #[test]
    fn test_two_column_places_side_sections_on_first_page() {
        let order = [
            SectionId::Experience,
            SectionId::Skills,
            SectionId::Certifications,
        ];
        let h = heights(&[
            (SectionId::Experience, 900.0),
            (SectionId::Skills, 400.0),
            (SectionId::Certifications, 300.0),
        ]);
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Two, 1000.0));
        assert_eq!(pages, vec![order.to_vec()]);
    }

    #[test]
    fn test_two_column_uses_taller_column_for_overflow_check() {
        let order = [SectionId::Experience, SectionId::Skills, SectionId::Projects];
        let h = heights(&[
            (SectionId::Experience, 600.0),
            (SectionId::Skills, 950.0),
            (SectionId::Projects, 100.0),
        ]);
        // Projects fits its own column but the side column already holds 950.
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Two, 900.0));
        assert_eq!(
            pages,
            vec![
                vec![SectionId::Experience],
                vec![SectionId::Skills],
                vec![SectionId::Projects]
            ]
        );
    }

    #[test]
    fn test_first_page_offset_reduces_room() {
        let order = [SectionId::Experience, SectionId::Skills];
        let h = heights(&[(SectionId::Experience, 500.0), (SectionId::Skills, 400.0)]);
        let mut p = params(LayoutMode::Single, 1000.0);
        p.first_page_main_offset_px = 200.0;
        let pages = pre_paginate(&order, &h, &p);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_unmeasured_sections_are_skipped() {
        let order = [SectionId::Experience, SectionId::Education];
        let h = heights(&[(SectionId::Experience, 100.0)]);
        let pages = pre_paginate(&order, &h, &params(LayoutMode::Single, 1000.0));
        assert_eq!(pages, vec![vec![SectionId::Experience]]);
    }
}
