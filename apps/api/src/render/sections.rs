//! Section Renderer: maps structured resume content to one markup fragment per section.
//!
//! Fragments are self-contained `<section>` elements keyed by `SectionId`. A
//! section with no entries produces no fragment at all, so callers never see an
//! empty section shell. All interpolated text goes through `escape_html`; every
//! emitted `href` goes through `safe_href`.

use std::collections::BTreeMap;

use crate::render::escape::{escape_html, safe_href};
use crate::resume::{
    CertificationEntry, EducationEntry, ExperienceEntry, LayoutMode, ProjectEntry, ResumeContent,
    SectionId, SkillGroup,
};

/// Rendered fragments, keyed by section id.
pub type SectionFragments = BTreeMap<SectionId, String>;

/// Renders every non-empty section of `content`.
pub fn render_sections(content: &ResumeContent, mode: LayoutMode) -> SectionFragments {
    SectionId::ALL
        .into_iter()
        .filter_map(|id| render_section(content, id, mode).map(|markup| (id, markup)))
        .collect()
}

/// Renders a single section, or `None` if it has nothing to show.
pub fn render_section(content: &ResumeContent, id: SectionId, mode: LayoutMode) -> Option<String> {
    if !content.has_section(id) {
        return None;
    }

    let body = match id {
        SectionId::Experience => content.experiences.iter().map(render_experience).collect(),
        SectionId::Projects => content.projects.iter().map(render_project).collect(),
        SectionId::Education => content.education.iter().map(render_education).collect(),
        SectionId::Certifications => content
            .certifications
            .iter()
            .map(render_certification)
            .collect(),
        SectionId::Skills => render_skills(&content.skills, mode),
    };

    Some(format!(
        "<section class=\"resume-section\" data-section=\"{id}\">\
         <h2 class=\"section-title\">{title}</h2>{body}</section>",
        id = id.as_str(),
        title = id.title(),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Per-entry renderers
// ────────────────────────────────────────────────────────────────────────────

fn render_experience(entry: &ExperienceEntry) -> String {
    let meta = join_present(&[entry.location.as_deref(), entry.period.as_deref()], " | ");
    format!(
        "<div class=\"entry\"><div class=\"entry-head\">\
         <span class=\"entry-title\">{role}</span>\
         <span class=\"entry-org\">{company}</span>{meta}</div>{bullets}</div>",
        role = escape_html(entry.role.trim()),
        company = escape_html(entry.company.trim()),
        meta = meta_span(&meta),
        bullets = render_bullets(&entry.bullets),
    )
}

fn render_project(entry: &ProjectEntry) -> String {
    let name = escape_html(entry.name.trim());
    let title = match entry.url.as_deref().and_then(safe_href) {
        Some(href) => format!("<a href=\"{}\">{name}</a>", escape_html(&href)),
        None => name,
    };
    let description = entry
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| format!("<p class=\"entry-desc\">{}</p>", escape_html(d)))
        .unwrap_or_default();
    format!(
        "<div class=\"entry\"><div class=\"entry-head\">\
         <span class=\"entry-title\">{title}</span>{meta}</div>{description}{bullets}</div>",
        meta = meta_span(entry.period.as_deref().unwrap_or_default().trim()),
        bullets = render_bullets(&entry.bullets),
    )
}

fn render_education(entry: &EducationEntry) -> String {
    let degree = join_present(&[entry.degree.as_deref(), entry.field.as_deref()], ", ");
    let degree = if degree.is_empty() {
        String::new()
    } else {
        format!("<span class=\"entry-org\">{}</span>", escape_html(&degree))
    };
    format!(
        "<div class=\"entry\"><div class=\"entry-head\">\
         <span class=\"entry-title\">{institution}</span>{degree}{meta}</div>{details}</div>",
        institution = escape_html(entry.institution.trim()),
        meta = meta_span(entry.period.as_deref().unwrap_or_default().trim()),
        details = render_bullets(&entry.details),
    )
}

fn render_certification(entry: &CertificationEntry) -> String {
    let name = escape_html(entry.name.trim());
    let name = match entry.url.as_deref().and_then(safe_href) {
        Some(href) => format!("<a href=\"{}\">{name}</a>", escape_html(&href)),
        None => name,
    };
    let meta = join_present(&[entry.issuer.as_deref(), entry.date.as_deref()], " | ");
    format!(
        "<div class=\"entry cert\"><span class=\"entry-title\">{name}</span>{}</div>",
        meta_span(&meta)
    )
}

/// One line per category (`Category: a, b`) in single-column mode; a category
/// header followed by item chips in two-column mode.
fn render_skills(groups: &[SkillGroup], mode: LayoutMode) -> String {
    let mut out = String::new();
    for group in groups {
        let items: Vec<String> = group
            .items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(escape_html)
            .collect();
        if items.is_empty() {
            continue;
        }
        let category = escape_html(group.category.trim());
        match mode {
            LayoutMode::Single => out.push_str(&format!(
                "<p class=\"skill-line\"><strong>{category}:</strong> {}</p>",
                items.join(", ")
            )),
            LayoutMode::Two => {
                let chips: String = items
                    .iter()
                    .map(|i| format!("<span class=\"chip\">{i}</span>"))
                    .collect();
                out.push_str(&format!(
                    "<div class=\"skill-group\"><div class=\"skill-category\">{category}</div>\
                     <div class=\"skill-chips\">{chips}</div></div>"
                ));
            }
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn render_bullets(bullets: &[String]) -> String {
    let items: String = bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(|b| format!("<li>{}</li>", escape_html(b)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("<ul class=\"bullets\">{items}</ul>")
    }
}

/// Unescaped join of the non-blank parts; callers escape the result.
fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn meta_span(meta: &str) -> String {
    if meta.is_empty() {
        String::new()
    } else {
        format!("<span class=\"entry-meta\">{}</span>", escape_html(meta))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_content() -> ResumeContent {
        ResumeContent {
            experiences: vec![ExperienceEntry {
                role: "Staff Engineer".to_string(),
                company: "Acme <Labs>".to_string(),
                location: Some("Berlin".to_string()),
                period: Some("2021 – now".to_string()),
                bullets: vec!["Cut p99 latency by 40%".to_string(), "  ".to_string()],
            }],
            skills: vec![
                SkillGroup {
                    category: "Languages".to_string(),
                    items: vec!["Rust".to_string(), "Go".to_string()],
                },
                SkillGroup {
                    category: "Empty".to_string(),
                    items: vec![" ".to_string()],
                },
            ],
            projects: vec![ProjectEntry {
                name: "pager".to_string(),
                url: Some("javascript:alert(1)".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_sections_omits_empty_sections() {
        let fragments = render_sections(&make_content(), LayoutMode::Single);
        let ids: Vec<SectionId> = fragments.keys().copied().collect();
        assert_eq!(
            ids,
            vec![SectionId::Experience, SectionId::Skills, SectionId::Projects]
        );
        assert!(render_section(&make_content(), SectionId::Education, LayoutMode::Single).is_none());
    }

    #[test]
    fn test_whitespace_only_skill_items_produce_no_section() {
        let content = ResumeContent {
            skills: vec![SkillGroup {
                category: "Languages".to_string(),
                items: vec!["   ".to_string(), String::new()],
            }],
            ..Default::default()
        };
        assert!(render_section(&content, SectionId::Skills, LayoutMode::Two).is_none());
        assert!(content.non_empty_order(&[SectionId::Skills]).is_empty());
    }

    #[test]
    fn test_experience_escapes_text_and_skips_blank_bullets() {
        let html = render_section(&make_content(), SectionId::Experience, LayoutMode::Single).unwrap();
        assert!(html.contains("Acme &lt;Labs&gt;"));
        assert!(html.contains("<li>Cut p99 latency by 40%</li>"));
        assert_eq!(html.matches("<li>").count(), 1);
        assert!(html.contains("Berlin | 2021 – now"));
    }

    #[test]
    fn test_skills_single_column_renders_category_lines() {
        let html = render_section(&make_content(), SectionId::Skills, LayoutMode::Single).unwrap();
        assert!(html.contains("<strong>Languages:</strong> Rust, Go"));
        assert!(!html.contains("Empty"));
    }

    #[test]
    fn test_skills_two_column_renders_chips() {
        let html = render_section(&make_content(), SectionId::Skills, LayoutMode::Two).unwrap();
        assert!(html.contains("<div class=\"skill-category\">Languages</div>"));
        assert!(html.contains("<span class=\"chip\">Rust</span><span class=\"chip\">Go</span>"));
    }

    #[test]
    fn test_project_with_script_url_is_not_linked() {
        let html = render_section(&make_content(), SectionId::Projects, LayoutMode::Single).unwrap();
        assert!(!html.contains("href"));
        assert!(!html.contains("javascript"));
        assert!(html.contains("pager"));
    }

    #[test]
    fn test_certification_with_safe_url_is_linked() {
        let content = ResumeContent {
            certifications: vec![CertificationEntry {
                name: "CKA".to_string(),
                issuer: Some("CNCF".to_string()),
                date: None,
                url: Some("https://cncf.io/cka?a=1&b=2".to_string()),
            }],
            ..Default::default()
        };
        let html = render_section(&content, SectionId::Certifications, LayoutMode::Two).unwrap();
        assert!(html.contains("<a href=\"https://cncf.io/cka?a=1&amp;b=2\">CKA</a>"));
        assert!(html.contains("<span class=\"entry-meta\">CNCF</span>"));
    }
}
