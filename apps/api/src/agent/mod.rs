//! Resume agent collaborator: turns a profile plus a job description into
//! tailored draft content.
//!
//! Pluggable: carried in `AppState` as `Arc<dyn ResumeAgent>`. The default
//! backend is `LlmResumeAgent`, which retries when the model names companies
//! that do not appear in the profile.

pub mod prompts;

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::prompts::{GENERATE_PROMPT_TEMPLATE, GENERATE_SYSTEM, RETRY_UNGROUNDED_SUFFIX};
use crate::drafts::diff::normalize_text;
use crate::errors::AppError;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::profile::Profile;
use crate::resume::{ExperienceEntry, ProjectEntry, ResumeContent, SkillGroup};

const MAX_GENERATION_RETRIES: u32 = 2;

/// The agent's answer. Anything it does not return is taken from the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDraft {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experiences: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, alias = "skillsByCategory")]
    pub skills_by_category: BTreeMap<String, Vec<String>>,
}

impl GeneratedDraft {
    /// Merges the generated parts over the profile content. Header contact
    /// details, education and certifications always come from the profile.
    pub fn into_content(self, profile: &ResumeContent) -> ResumeContent {
        let mut content = profile.clone();
        if !self.summary.trim().is_empty() {
            content.header.summary = Some(self.summary.trim().to_string());
        }
        if !self.experiences.is_empty() {
            content.experiences = self.experiences;
        }
        if !self.projects.is_empty() {
            content.projects = self.projects;
        }
        let skills: Vec<SkillGroup> = self
            .skills_by_category
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(category, items)| SkillGroup { category, items })
            .collect();
        if !skills.is_empty() {
            content.skills = skills;
        }
        content
    }
}

#[async_trait]
pub trait ResumeAgent: Send + Sync {
    async fn generate(
        &self,
        profile: &Profile,
        job_description: &str,
    ) -> Result<GeneratedDraft, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed agent
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeAgent {
    llm: LlmClient,
}

impl LlmResumeAgent {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAgent for LlmResumeAgent {
    async fn generate(
        &self,
        profile: &Profile,
        job_description: &str,
    ) -> Result<GeneratedDraft, AppError> {
        let base_prompt = build_generation_prompt(profile, job_description)?;
        let mut prompt = base_prompt.clone();
        let system = generation_system_prompt();

        for attempt in 0..=MAX_GENERATION_RETRIES {
            let draft: GeneratedDraft = self
                .llm
                .call_json(&prompt, &system)
                .await
                .map_err(|e| AppError::Llm(format!("Draft generation call failed: {e}")))?;

            let ungrounded = ungrounded_companies(&draft, &profile.content);
            if ungrounded.is_empty() {
                info!(
                    profile = %profile.id,
                    experiences = draft.experiences.len(),
                    projects = draft.projects.len(),
                    "draft generated"
                );
                return Ok(draft);
            }

            warn!(
                attempt = attempt + 1,
                max = MAX_GENERATION_RETRIES + 1,
                companies = ?ungrounded,
                "generated draft names companies missing from the profile, retrying"
            );
            prompt = format!(
                "{base_prompt}{}",
                RETRY_UNGROUNDED_SUFFIX.replace("{companies}", &ungrounded.join(", "))
            );
        }

        Err(AppError::Llm(format!(
            "Draft generation failed after {} attempts: output kept naming companies not in the profile",
            MAX_GENERATION_RETRIES + 1
        )))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Role prompt followed by the shared JSON-only rules.
fn generation_system_prompt() -> String {
    format!("{GENERATE_SYSTEM} {JSON_ONLY_SYSTEM}")
}

fn build_generation_prompt(profile: &Profile, job_description: &str) -> Result<String, AppError> {
    let profile_json = serde_json::to_string_pretty(&profile.content)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    Ok(GENERATE_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{job_description}", job_description.trim())
        .replace("{profile_json}", &profile_json))
}

/// Companies in the draft that the profile never mentions (case and
/// whitespace insensitive).
fn ungrounded_companies(draft: &GeneratedDraft, profile: &ResumeContent) -> Vec<String> {
    let known: HashSet<String> = profile
        .experiences
        .iter()
        .map(|e| normalize_text(&e.company).to_lowercase())
        .collect();
    draft
        .experiences
        .iter()
        .map(|e| e.company.trim())
        .filter(|company| !known.contains(&normalize_text(company).to_lowercase()))
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
