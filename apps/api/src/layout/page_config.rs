//! Page geometry and reflow tunables.
//!
//! All measurements are CSS pixels at the configured DPI. The page is A4; the
//! body content box is the page height minus top and bottom padding.
//!
//! Two bottom reserves exist:
//! - `prepaginate_headroom_px` absorbs rounding/border effects when the
//!   one-shot estimator sums measured heights.
//! - `reflow_bottom_reserve_px` is subtracted from the live content-box bottom
//!   before the live engine compares it against rendered content.

use serde::{Deserialize, Serialize};

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MM_PER_INCH: f32 = 25.4;

/// Layout parameters shared by the pre-paginator and the live engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub dpi: f32,
    pub page_width_px: f32,
    pub page_height_px: f32,
    /// Padding on every side of the page body.
    pub padding_px: f32,
    /// Bottom headroom reserved by the pre-paginator.
    pub prepaginate_headroom_px: f32,
    /// Vertical gap inserted between consecutive sections in one column.
    pub section_gap_px: f32,
    /// Bottom reserve subtracted from the live content-box bottom.
    pub reflow_bottom_reserve_px: f32,
    /// Overflow smaller than this is treated as sub-pixel noise.
    pub overflow_tolerance_px: f32,
    /// Safety cap on push/pull iterations per page (or page pair).
    pub max_iterations_per_page: usize,
    /// Safety cap on push+pull rounds in one repagination pass.
    pub max_rounds: usize,
    /// Whether the first page's last remaining section may be pushed forward,
    /// leaving a header-only first page.
    pub drain_first_page: bool,
    /// Height of the visual gap marker between pages in the editor.
    pub page_gap_px: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        default_layout_config()
    }
}

/// Returns the default layout config: A4 at 96 DPI with 48px padding.
pub fn default_layout_config() -> LayoutConfig {
    LayoutConfig::for_dpi(96.0)
}

impl LayoutConfig {
    /// A4 geometry at the given DPI with the default tunables.
    pub fn for_dpi(dpi: f32) -> Self {
        Self {
            dpi,
            page_width_px: mm_to_px(A4_WIDTH_MM, dpi),
            page_height_px: mm_to_px(A4_HEIGHT_MM, dpi),
            padding_px: 48.0,
            prepaginate_headroom_px: 12.0,
            section_gap_px: 16.0,
            reflow_bottom_reserve_px: 4.0,
            overflow_tolerance_px: 0.5,
            max_iterations_per_page: 50,
            max_rounds: 16,
            drain_first_page: true,
            page_gap_px: 24.0,
        }
    }

    /// Height of the page body content box.
    pub fn content_height_px(&self) -> f32 {
        (self.page_height_px - 2.0 * self.padding_px).max(0.0)
    }

    /// Capacity the pre-paginator fills before starting a new page.
    pub fn prepaginate_capacity_px(&self) -> f32 {
        prepaginate_capacity(self.content_height_px(), self.prepaginate_headroom_px)
    }
}

/// Content-box height minus the headroom reserve, never negative.
pub fn prepaginate_capacity(content_box_height: f32, headroom: f32) -> f32 {
    (content_box_height - headroom).max(0.0)
}

fn mm_to_px(mm: f32, dpi: f32) -> f32 {
    (mm / MM_PER_INCH * dpi).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_at_96_dpi() {
        let config = default_layout_config();
        assert_eq!(config.page_width_px, 794.0);
        assert_eq!(config.page_height_px, 1123.0);
        assert_eq!(config.content_height_px(), 1027.0);
        assert_eq!(config.prepaginate_capacity_px(), 1015.0);
    }

    #[test]
    fn test_dpi_scales_page_geometry() {
        let config = LayoutConfig::for_dpi(72.0);
        assert_eq!(config.page_width_px, 595.0);
        assert_eq!(config.page_height_px, 842.0);
    }

    #[test]
    fn test_capacity_never_negative() {
        assert_eq!(prepaginate_capacity(10.0, 12.0), 0.0);
    }
}
