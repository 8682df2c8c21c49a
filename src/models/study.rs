// study-service/src/models/study.rs
use crate::models::role::{deserialize_lenient_role, Capabilities, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyStatus {
    Draft,
    Published,
}

// Reference to a competency quiz owned by the quiz service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blinded: bool,
    #[serde(default)]
    pub access_window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_window_end: Option<DateTime<Utc>>,
    pub status: StudyStatus,
    #[serde(default)]
    pub latest_published_version: Option<u32>,
    pub next_version_number: u32,
    #[serde(default)]
    pub has_unpublished_changes: bool,
    #[serde(default)]
    pub competency_quiz: Option<QuizRef>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable metadata. `POST /api/studies` and `PUT /api/studies/{id}` share this body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blinded: bool,
    #[serde(default)]
    pub access_window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_window_end: Option<DateTime<Utc>>,
}

impl StudyFields {
    /// Field-level problems, each a human-readable sentence.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("Title is required".to_string());
        }
        if let (Some(start), Some(end)) = (self.access_window_start, self.access_window_end) {
            if end <= start {
                problems.push("Access window end must be after its start".to_string());
            }
        }
        problems
    }
}

impl From<&Study> for StudyFields {
    fn from(study: &Study) -> Self {
        Self {
            title: study.title.clone(),
            description: study.description.clone(),
            blinded: study.blinded,
            access_window_start: study.access_window_start,
            access_window_end: study.access_window_end,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssignQuizRequest {
    pub quiz_id: String,
}

/// A study as listed for one user, with that user's derived access.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    #[serde(flatten)]
    pub study: Study,
    pub permissions: Capabilities,
    #[serde(default, deserialize_with = "deserialize_lenient_role")]
    pub current_role: Option<Role>,
}

// Snapshot recorded each time a study is published
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishedVersion {
    pub version: u32,
    pub title: String,
    pub published_by: String,
    pub published_at: DateTime<Utc>,
}
