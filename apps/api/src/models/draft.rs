use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::resume::{LayoutMode, ResumeContent, SectionId};

/// Row of the `drafts` table.
///
/// `content` is the working copy, `generated` the agent's output and
/// `original` the profile-derived baseline; the last two never change after
/// insert.
#[derive(Debug, Clone, FromRow)]
pub struct DraftRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub job_description: String,
    pub layout: String,
    pub section_order: Json<Vec<SectionId>>,
    pub content: Json<ResumeContent>,
    pub generated: Json<ResumeContent>,
    pub original: Json<ResumeContent>,
    pub committed_markup: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub job_description: String,
    pub layout: LayoutMode,
    pub section_order: Vec<SectionId>,
    pub content: ResumeContent,
    pub generated: ResumeContent,
    pub original: ResumeContent,
    pub committed_markup: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DraftRow> for Draft {
    fn from(row: DraftRow) -> Self {
        let layout = row.layout.parse().unwrap_or_else(|err: String| {
            warn!(draft = %row.id, "{err}, falling back to single column");
            LayoutMode::Single
        });
        Draft {
            id: row.id,
            profile_id: row.profile_id,
            job_description: row.job_description,
            layout,
            section_order: row.section_order.0,
            content: row.content.0,
            generated: row.generated.0,
            original: row.original.0,
            committed_markup: row.committed_markup,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Everything needed to insert a fresh draft.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub profile_id: Uuid,
    pub job_description: String,
    pub layout: LayoutMode,
    pub section_order: Vec<SectionId>,
    pub generated: ResumeContent,
    pub original: ResumeContent,
}
