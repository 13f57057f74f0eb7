//! Resume data model: sections, layout modes and the entry records they render.
//!
//! Sections are the atomic unit of pagination: a section is rendered as one
//! self-contained fragment and is never split across pages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Section ids and layout modes
// ────────────────────────────────────────────────────────────────────────────

/// The fixed set of resume sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Experience,
    Skills,
    Education,
    Projects,
    Certifications,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::Experience,
        SectionId::Skills,
        SectionId::Education,
        SectionId::Projects,
        SectionId::Certifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Experience => "experience",
            SectionId::Skills => "skills",
            SectionId::Education => "education",
            SectionId::Projects => "projects",
            SectionId::Certifications => "certifications",
        }
    }

    /// Heading text shown at the top of the rendered section.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::Experience => "Experience",
            SectionId::Skills => "Skills",
            SectionId::Education => "Education",
            SectionId::Projects => "Projects",
            SectionId::Certifications => "Certifications",
        }
    }

    /// Column this section lives in for the given layout.
    ///
    /// Only `skills` and `certifications` move to the side column, and only in
    /// two-column mode.
    pub fn column(&self, mode: LayoutMode) -> ColumnKind {
        match (mode, self) {
            (LayoutMode::Two, SectionId::Skills | SectionId::Certifications) => ColumnKind::Side,
            _ => ColumnKind::Main,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown section id '{s}'"))
    }
}

/// Page layout: one content column, or a narrow side column plus a main column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Single,
    Two,
}

impl LayoutMode {
    /// Columns a page of this mode exposes, in overflow-preference order.
    pub fn columns(&self) -> &'static [ColumnKind] {
        match self {
            LayoutMode::Single => &[ColumnKind::Main],
            LayoutMode::Two => &[ColumnKind::Main, ColumnKind::Side],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Single => "single",
            LayoutMode::Two => "two",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "one" => Ok(LayoutMode::Single),
            "two" => Ok(LayoutMode::Two),
            other => Err(format!("unknown layout mode '{other}'")),
        }
    }
}

/// A content column on a page. Single-column pages expose only `Main` (the body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Main,
    Side,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

/// Skills grouped under one category heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationEntry {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.location.is_none() && self.links.is_empty()
    }
}

/// First-page header: name, optional headline, summary and contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// The full structured resume: header plus one list per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    #[serde(default)]
    pub header: HeaderInfo,
    #[serde(default)]
    pub experiences: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
}

impl ResumeContent {
    /// True if the section has at least one entry to render.
    pub fn has_section(&self, id: SectionId) -> bool {
        match id {
            SectionId::Experience => !self.experiences.is_empty(),
            SectionId::Skills => self
                .skills
                .iter()
                .any(|g| g.items.iter().any(|i| !i.trim().is_empty())),
            SectionId::Education => !self.education.is_empty(),
            SectionId::Projects => !self.projects.is_empty(),
            SectionId::Certifications => !self.certifications.is_empty(),
        }
    }

    /// Filters a caller-supplied order down to sections with content.
    /// Duplicate ids keep their first position.
    pub fn non_empty_order(&self, order: &[SectionId]) -> Vec<SectionId> {
        let mut out: Vec<SectionId> = Vec::with_capacity(order.len());
        for &id in order {
            if self.has_section(id) && !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
