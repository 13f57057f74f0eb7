//! Persistence collaborator: profiles and drafts behind one async trait.
//!
//! Carried in `AppState` as `Arc<dyn ProfileRepository>`. The Postgres backend
//! stores structured content as JSONB; the committed markup is whatever the
//! editor handed over on blur, stored verbatim.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::draft::{Draft, DraftRow, NewDraft};
use crate::models::profile::{Profile, ProfileRow};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError>;

    /// Inserts a draft whose working copy starts as the generated content.
    async fn save_draft(&self, draft: NewDraft) -> Result<Draft, AppError>;

    /// Stores the editor's committed markup. `None` if the draft does not exist.
    async fn commit_markup(&self, id: Uuid, markup: &str) -> Result<Option<Draft>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, content, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Profile::from))
    }

    async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError> {
        let row = sqlx::query_as::<_, DraftRow>("SELECT * FROM drafts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Draft::from))
    }

    async fn save_draft(&self, draft: NewDraft) -> Result<Draft, AppError> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            INSERT INTO drafts
                (id, profile_id, job_description, layout, section_order,
                 content, generated, original)
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.profile_id)
        .bind(&draft.job_description)
        .bind(draft.layout.as_str())
        .bind(Json(&draft.section_order))
        .bind(Json(&draft.generated))
        .bind(Json(&draft.original))
        .fetch_one(&self.pool)
        .await?;

        info!(draft = %row.id, profile = %row.profile_id, "draft saved");
        Ok(row.into())
    }

    async fn commit_markup(&self, id: Uuid, markup: &str) -> Result<Option<Draft>, AppError> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET committed_markup = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(markup)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Draft::from))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend for handler tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::resume::ResumeContent;

    #[derive(Default)]
    pub struct MemoryProfileRepository {
        profiles: Mutex<HashMap<Uuid, Profile>>,
        drafts: Mutex<HashMap<Uuid, Draft>>,
    }

    impl MemoryProfileRepository {
        pub fn insert_profile(&self, content: ResumeContent) -> Uuid {
            let id = Uuid::new_v4();
            self.profiles.lock().unwrap().insert(
                id,
                Profile {
                    id,
                    content,
                    updated_at: Utc::now(),
                },
            );
            id
        }
    }

    #[async_trait]
    impl ProfileRepository for MemoryProfileRepository {
        async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
            Ok(self.profiles.lock().unwrap().get(&id).cloned())
        }

        async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError> {
            Ok(self.drafts.lock().unwrap().get(&id).cloned())
        }

        async fn save_draft(&self, draft: NewDraft) -> Result<Draft, AppError> {
            let now = Utc::now();
            let saved = Draft {
                id: Uuid::new_v4(),
                profile_id: draft.profile_id,
                job_description: draft.job_description,
                layout: draft.layout,
                section_order: draft.section_order,
                content: draft.generated.clone(),
                generated: draft.generated,
                original: draft.original,
                committed_markup: None,
                created_at: now,
                updated_at: now,
            };
            self.drafts
                .lock()
                .unwrap()
                .insert(saved.id, saved.clone());
            Ok(saved)
        }

        async fn commit_markup(&self, id: Uuid, markup: &str) -> Result<Option<Draft>, AppError> {
            let mut drafts = self.drafts.lock().unwrap();
            Ok(drafts.get_mut(&id).map(|draft| {
                draft.committed_markup = Some(markup.to_string());
                draft.updated_at = Utc::now();
                draft.clone()
            }))
        }
    }
}
