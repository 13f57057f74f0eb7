//! Page Assembler: arranges rendered section fragments into page containers.
//!
//! Output is the initial markup handed to the editor surface. The first page
//! carries the header block (and the contact details); every page gets a label
//! only when there is more than one page; consecutive pages are separated by a
//! gap marker unless disabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::render::escape::{escape_html, safe_href};
use crate::resume::{ColumnKind, ContactInfo, HeaderInfo, LayoutMode, SectionId};

/// Options controlling page assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleOptions {
    pub mode: LayoutMode,
    /// Emit a gap marker between consecutive pages.
    #[serde(default = "default_true")]
    pub show_gaps: bool,
    /// Accent colour as `#rgb` or `#rrggbb`; anything else is ignored.
    #[serde(default)]
    pub accent: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Single,
            show_gaps: true,
            accent: None,
        }
    }
}

/// Emits one page container per partition group.
///
/// Sections are placed in global `order`; ids that appear in a group but not in
/// `order` (or that have no fragment) are skipped. An empty partition places
/// every ordered section on a single page.
pub fn assemble_pages(
    order: &[SectionId],
    partition: &[Vec<SectionId>],
    fragments: &BTreeMap<SectionId, String>,
    header: &HeaderInfo,
    options: &AssembleOptions,
) -> String {
    let single_group;
    let groups: &[Vec<SectionId>] = if partition.is_empty() {
        single_group = vec![order.to_vec()];
        &single_group
    } else {
        partition
    };

    let page_count = groups.len();
    let accent = options.accent.as_deref().filter(|a| is_hex_colour(a));
    let mut out = String::new();

    for (index, group) in groups.iter().enumerate() {
        if index > 0 && options.show_gaps {
            out.push_str("<div class=\"page-gap\" aria-hidden=\"true\"></div>");
        }

        let placed: Vec<SectionId> = order
            .iter()
            .copied()
            .filter(|id| group.contains(id) && fragments.contains_key(id))
            .collect();
        let column_markup = |kind: ColumnKind| -> String {
            placed
                .iter()
                .filter(|id| id.column(options.mode) == kind)
                .filter_map(|id| fragments.get(id))
                .map(String::as_str)
                .collect()
        };

        let style = accent
            .map(|a| format!(" style=\"--accent: {a}\""))
            .unwrap_or_default();
        out.push_str(&format!(
            "<div class=\"resume-page\" data-page=\"{index}\" data-layout=\"{}\"{style}>",
            options.mode.as_str()
        ));

        let first = index == 0;
        match options.mode {
            LayoutMode::Single => {
                out.push_str("<div class=\"page-body\" data-column=\"main\">");
                if first {
                    out.push_str(&render_header(header));
                    out.push_str(&render_contact_line(&header.contact));
                }
                out.push_str(&column_markup(ColumnKind::Main));
                out.push_str("</div>");
            }
            LayoutMode::Two => {
                out.push_str("<div class=\"page-columns\"><aside class=\"page-side\" data-column=\"side\">");
                if first {
                    out.push_str(&render_contact_card(&header.contact));
                }
                out.push_str(&column_markup(ColumnKind::Side));
                out.push_str("</aside><main class=\"page-main\" data-column=\"main\">");
                if first {
                    out.push_str(&render_header(header));
                }
                out.push_str(&column_markup(ColumnKind::Main));
                out.push_str("</main></div>");
            }
        }

        if page_count > 1 {
            out.push_str(&format!(
                "<div class=\"page-label\">Page {}</div>",
                index + 1
            ));
        }
        out.push_str("</div>");
    }

    out
}

// ────────────────────────────────────────────────────────────────────────────
// Header and contact blocks
// ────────────────────────────────────────────────────────────────────────────

fn render_header(header: &HeaderInfo) -> String {
    let mut out = format!(
        "<header class=\"resume-header\"><h1 class=\"full-name\">{}</h1>",
        escape_html(header.full_name.trim())
    );
    if let Some(headline) = non_blank(header.headline.as_deref()) {
        out.push_str(&format!("<p class=\"headline\">{}</p>", escape_html(headline)));
    }
    if let Some(summary) = non_blank(header.summary.as_deref()) {
        out.push_str(&format!("<p class=\"summary\">{}</p>", escape_html(summary)));
    }
    out.push_str("</header>");
    out
}

/// Inline contact line for single-column pages.
fn render_contact_line(contact: &ContactInfo) -> String {
    let parts = contact_parts(contact);
    if parts.is_empty() {
        return String::new();
    }
    format!(
        "<p class=\"contact-line\">{}</p>",
        parts.join("<span class=\"sep\"> · </span>")
    )
}

/// Standalone contact card at the top of the side column.
fn render_contact_card(contact: &ContactInfo) -> String {
    let parts = contact_parts(contact);
    if parts.is_empty() {
        return String::new();
    }
    let lines: String = parts
        .iter()
        .map(|p| format!("<div class=\"contact-item\">{p}</div>"))
        .collect();
    format!("<div class=\"contact-card\">{lines}</div>")
}

fn contact_parts(contact: &ContactInfo) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(email) = non_blank(contact.email.as_deref()) {
        parts.push(link_or_text(&format!("mailto:{email}"), email));
    }
    if let Some(phone) = non_blank(contact.phone.as_deref()) {
        parts.push(link_or_text(&format!("tel:{phone}"), phone));
    }
    if let Some(location) = non_blank(contact.location.as_deref()) {
        parts.push(escape_html(location));
    }
    for link in &contact.links {
        let label = if link.label.trim().is_empty() {
            link.url.trim()
        } else {
            link.label.trim()
        };
        if !label.is_empty() {
            parts.push(link_or_text(&link.url, label));
        }
    }
    parts
}

fn link_or_text(raw_href: &str, text: &str) -> String {
    match safe_href(raw_href) {
        Some(href) => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&href),
            escape_html(text)
        ),
        None => escape_html(text),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_hex_colour(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::ContactLink;

    fn make_header() -> HeaderInfo {
        HeaderInfo {
            full_name: "Ada Lovelace".to_string(),
            headline: Some("Analyst".to_string()),
            summary: Some("Writes <notes>".to_string()),
            contact: ContactInfo {
                email: Some("ada@example.com".to_string()),
                phone: None,
                location: Some("London".to_string()),
                links: vec![ContactLink {
                    label: "Site".to_string(),
                    url: "javascript:alert(1)".to_string(),
                }],
            },
        }
    }

    fn make_fragments() -> BTreeMap<SectionId, String> {
        [
            (SectionId::Experience, "<section>EXP</section>".to_string()),
            (SectionId::Skills, "<section>SKL</section>".to_string()),
            (SectionId::Certifications, "<section>CRT</section>".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_page_has_header_and_no_label() {
        let order = [SectionId::Experience, SectionId::Skills];
        let html = assemble_pages(
            &order,
            &[],
            &make_fragments(),
            &make_header(),
            &AssembleOptions::default(),
        );
        assert_eq!(html.matches("class=\"resume-page\"").count(), 1);
        assert!(html.contains("<h1 class=\"full-name\">Ada Lovelace</h1>"));
        assert!(html.contains("Writes &lt;notes&gt;"));
        assert!(html.contains("class=\"contact-line\""));
        assert!(!html.contains("page-label"));
        assert!(!html.contains("page-gap"));
        assert!(html.find("EXP").unwrap() < html.find("SKL").unwrap());
    }

    #[test]
    fn test_multi_page_labels_gaps_and_header_only_on_first() {
        let order = [SectionId::Experience, SectionId::Skills];
        let partition = vec![vec![SectionId::Experience], vec![SectionId::Skills]];
        let html = assemble_pages(
            &order,
            &partition,
            &make_fragments(),
            &make_header(),
            &AssembleOptions::default(),
        );
        assert_eq!(html.matches("class=\"resume-page\"").count(), 2);
        assert_eq!(html.matches("resume-header").count(), 1);
        assert_eq!(html.matches("page-gap").count(), 1);
        let p1 = html.find("Page 1").unwrap();
        let p2 = html.find("Page 2").unwrap();
        assert!(p1 < html.find("page-gap").unwrap() && html.find("page-gap").unwrap() < p2);
    }

    #[test]
    fn test_gap_markers_can_be_disabled() {
        let order = [SectionId::Experience, SectionId::Skills];
        let partition = vec![vec![SectionId::Experience], vec![SectionId::Skills]];
        let options = AssembleOptions {
            show_gaps: false,
            ..Default::default()
        };
        let html = assemble_pages(&order, &partition, &make_fragments(), &make_header(), &options);
        assert!(!html.contains("page-gap"));
    }

    #[test]
    fn test_two_column_places_contact_card_and_side_sections() {
        let order = [
            SectionId::Experience,
            SectionId::Skills,
            SectionId::Certifications,
        ];
        let options = AssembleOptions {
            mode: LayoutMode::Two,
            ..Default::default()
        };
        let html = assemble_pages(&order, &[], &make_fragments(), &make_header(), &options);
        let side_start = html.find("page-side").unwrap();
        let main_start = html.find("page-main").unwrap();
        let card = html.find("contact-card").unwrap();
        assert!(side_start < card && card < main_start);
        assert!(side_start < html.find("SKL").unwrap() && html.find("CRT").unwrap() < main_start);
        assert!(html.find("EXP").unwrap() > main_start);
        assert!(!html.contains("contact-line"));
    }

    #[test]
    fn test_unsafe_contact_link_renders_as_text() {
        let html = assemble_pages(
            &[SectionId::Experience],
            &[],
            &make_fragments(),
            &make_header(),
            &AssembleOptions::default(),
        );
        assert!(html.contains("<a href=\"mailto:ada@example.com\">ada@example.com</a>"));
        assert!(!html.contains("javascript"));
        assert!(html.contains("Site"));
    }

    #[test]
    fn test_accent_must_be_hex() {
        let order = [SectionId::Experience];
        let good = AssembleOptions {
            accent: Some("#1a2b3c".to_string()),
            ..Default::default()
        };
        let bad = AssembleOptions {
            accent: Some("red;}body{".to_string()),
            ..Default::default()
        };
        let html = assemble_pages(&order, &[], &make_fragments(), &make_header(), &good);
        assert!(html.contains("--accent: #1a2b3c"));
        let html = assemble_pages(&order, &[], &make_fragments(), &make_header(), &bad);
        assert!(!html.contains("--accent"));
    }
}
