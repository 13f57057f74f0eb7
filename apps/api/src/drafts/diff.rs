//! Draft Diff: dirty tracking and field provenance for edited drafts.
//!
//! Both sides are normalized before comparison (trimmed, whitespace runs
//! collapsed, empty bullets and entries dropped), so cosmetic edits such as a
//! trailing space never mark a draft dirty. Lists are compared by index.

use serde::Serialize;

use crate::resume::{
    CertificationEntry, ContactInfo, ContactLink, EducationEntry, ExperienceEntry, HeaderInfo,
    ProjectEntry, ResumeContent, SkillGroup,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryChange {
    Unchanged,
    Modified,
    Added,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListDiff {
    pub changes: Vec<EntryChange>,
}

impl ListDiff {
    pub fn is_dirty(&self) -> bool {
        self.changes.iter().any(|c| *c != EntryChange::Unchanged)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeaderDiff {
    pub full_name: bool,
    pub headline: bool,
    pub summary: bool,
    pub contact: bool,
}

impl HeaderDiff {
    pub fn is_dirty(&self) -> bool {
        self.full_name || self.headline || self.summary || self.contact
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DraftDiff {
    pub header: HeaderDiff,
    pub experiences: ListDiff,
    pub projects: ListDiff,
    pub education: ListDiff,
    pub skills: ListDiff,
    pub certifications: ListDiff,
}

impl DraftDiff {
    pub fn is_dirty(&self) -> bool {
        self.header.is_dirty()
            || [
                &self.experiences,
                &self.projects,
                &self.education,
                &self.skills,
                &self.certifications,
            ]
            .iter()
            .any(|list| list.is_dirty())
    }
}

/// Where a field's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrigin {
    Original,
    Generated,
    UserEdited,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Trims and collapses internal whitespace runs to a single space.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(normalize_text)
        .filter(|v| !v.is_empty())
}

fn normalize_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| normalize_text(l))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Normalized copy of an entry, or `None` when every field is empty.
trait Normalize: Sized {
    fn normalized(&self) -> Option<Self>;
}

impl Normalize for ExperienceEntry {
    fn normalized(&self) -> Option<Self> {
        let entry = ExperienceEntry {
            role: normalize_text(&self.role),
            company: normalize_text(&self.company),
            location: normalize_opt(&self.location),
            period: normalize_opt(&self.period),
            bullets: normalize_lines(&self.bullets),
        };
        let empty = entry.role.is_empty()
            && entry.company.is_empty()
            && entry.location.is_none()
            && entry.period.is_none()
            && entry.bullets.is_empty();
        (!empty).then_some(entry)
    }
}

impl Normalize for ProjectEntry {
    fn normalized(&self) -> Option<Self> {
        let entry = ProjectEntry {
            name: normalize_text(&self.name),
            description: normalize_opt(&self.description),
            url: normalize_opt(&self.url),
            period: normalize_opt(&self.period),
            bullets: normalize_lines(&self.bullets),
        };
        let empty = entry.name.is_empty()
            && entry.description.is_none()
            && entry.url.is_none()
            && entry.period.is_none()
            && entry.bullets.is_empty();
        (!empty).then_some(entry)
    }
}

impl Normalize for EducationEntry {
    fn normalized(&self) -> Option<Self> {
        let entry = EducationEntry {
            institution: normalize_text(&self.institution),
            degree: normalize_opt(&self.degree),
            field: normalize_opt(&self.field),
            period: normalize_opt(&self.period),
            details: normalize_lines(&self.details),
        };
        let empty = entry.institution.is_empty()
            && entry.degree.is_none()
            && entry.field.is_none()
            && entry.period.is_none()
            && entry.details.is_empty();
        (!empty).then_some(entry)
    }
}

impl Normalize for SkillGroup {
    fn normalized(&self) -> Option<Self> {
        let group = SkillGroup {
            category: normalize_text(&self.category),
            items: normalize_lines(&self.items),
        };
        (!group.items.is_empty()).then_some(group)
    }
}

impl Normalize for CertificationEntry {
    fn normalized(&self) -> Option<Self> {
        let entry = CertificationEntry {
            name: normalize_text(&self.name),
            issuer: normalize_opt(&self.issuer),
            date: normalize_opt(&self.date),
            url: normalize_opt(&self.url),
        };
        let empty = entry.name.is_empty()
            && entry.issuer.is_none()
            && entry.date.is_none()
            && entry.url.is_none();
        (!empty).then_some(entry)
    }
}

fn normalize_list<T: Normalize>(entries: &[T]) -> Vec<T> {
    entries.iter().filter_map(Normalize::normalized).collect()
}

fn normalize_contact(contact: &ContactInfo) -> ContactInfo {
    ContactInfo {
        email: normalize_opt(&contact.email),
        phone: normalize_opt(&contact.phone),
        location: normalize_opt(&contact.location),
        links: contact
            .links
            .iter()
            .map(|l| ContactLink {
                label: normalize_text(&l.label),
                url: l.url.trim().to_string(),
            })
            .filter(|l| !l.url.is_empty())
            .collect(),
    }
}

fn normalize_header(header: &HeaderInfo) -> HeaderInfo {
    HeaderInfo {
        full_name: normalize_text(&header.full_name),
        headline: normalize_opt(&header.headline),
        summary: normalize_opt(&header.summary),
        contact: normalize_contact(&header.contact),
    }
}

/// Normalized copy of the whole content.
pub fn normalize_content(content: &ResumeContent) -> ResumeContent {
    ResumeContent {
        header: normalize_header(&content.header),
        experiences: normalize_list(&content.experiences),
        projects: normalize_list(&content.projects),
        education: normalize_list(&content.education),
        skills: normalize_list(&content.skills),
        certifications: normalize_list(&content.certifications),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Comparison
// ────────────────────────────────────────────────────────────────────────────

fn diff_list<T: PartialEq>(baseline: &[T], current: &[T]) -> ListDiff {
    let len = baseline.len().max(current.len());
    let changes = (0..len)
        .map(|i| match (baseline.get(i), current.get(i)) {
            (Some(b), Some(c)) if b == c => EntryChange::Unchanged,
            (Some(_), Some(_)) => EntryChange::Modified,
            (None, Some(_)) => EntryChange::Added,
            (Some(_), None) | (None, None) => EntryChange::Removed,
        })
        .collect();
    ListDiff { changes }
}

/// Compares `current` against `baseline` after normalizing both.
pub fn diff_drafts(baseline: &ResumeContent, current: &ResumeContent) -> DraftDiff {
    let base = normalize_content(baseline);
    let cur = normalize_content(current);

    DraftDiff {
        header: HeaderDiff {
            full_name: base.header.full_name != cur.header.full_name,
            headline: base.header.headline != cur.header.headline,
            summary: base.header.summary != cur.header.summary,
            contact: base.header.contact != cur.header.contact,
        },
        experiences: diff_list(&base.experiences, &cur.experiences),
        projects: diff_list(&base.projects, &cur.projects),
        education: diff_list(&base.education, &cur.education),
        skills: diff_list(&base.skills, &cur.skills),
        certifications: diff_list(&base.certifications, &cur.certifications),
    }
}

/// Provenance of one text field. A value equal to both baselines counts as
/// generated.
pub fn classify_field(current: &str, generated: &str, original: &str) -> FieldOrigin {
    let current = normalize_text(current);
    if current == normalize_text(generated) {
        FieldOrigin::Generated
    } else if current == normalize_text(original) {
        FieldOrigin::Original
    } else {
        FieldOrigin::UserEdited
    }
}

/// Provenance of the header text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderProvenance {
    pub full_name: FieldOrigin,
    pub headline: FieldOrigin,
    pub summary: FieldOrigin,
}

pub fn header_provenance(
    current: &HeaderInfo,
    generated: &HeaderInfo,
    original: &HeaderInfo,
) -> HeaderProvenance {
    HeaderProvenance {
        full_name: classify_field(&current.full_name, &generated.full_name, &original.full_name),
        headline: classify_field(
            text_or_empty(&current.headline),
            text_or_empty(&generated.headline),
            text_or_empty(&original.headline),
        ),
        summary: classify_field(
            text_or_empty(&current.summary),
            text_or_empty(&generated.summary),
            text_or_empty(&original.summary),
        ),
    }
}

fn text_or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
