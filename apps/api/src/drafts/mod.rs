// Drafts: generated resumes, their rendering and edit tracking.

pub mod diff;
pub mod handlers;
