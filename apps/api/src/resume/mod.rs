// Structured resume content shared by rendering, layout, diffing and the agent.

pub mod model;

pub use model::{
    CertificationEntry, ColumnKind, ContactInfo, ContactLink, EducationEntry, ExperienceEntry,
    HeaderInfo, LayoutMode, ProjectEntry, ResumeContent, SectionId, SkillGroup,
};
