// study-service/src/services/version_state.rs
//
// Draft/publish lifecycle of a study and its version counters.
use crate::models::{
    PublishedVersion, QuizRef, ServiceError, Study, StudyFields, StudyStatus,
};
use crate::services::permission_resolver::ResolvedAccess;
use chrono::Utc;
use log::{debug, error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionPhase {
    /// Never published.
    DraftNew,
    /// Published at least once, with edits pending.
    DraftWithChanges,
    /// Published and nothing pending.
    PublishedCurrent,
}

pub fn phase(study: &Study) -> VersionPhase {
    if study.latest_published_version.is_none() {
        VersionPhase::DraftNew
    } else if study.has_unpublished_changes || study.status == StudyStatus::Draft {
        VersionPhase::DraftWithChanges
    } else {
        VersionPhase::PublishedCurrent
    }
}

pub fn new_draft(fields: StudyFields, created_by: &str) -> Study {
    let now = Utc::now();
    Study {
        id: uuid::Uuid::new_v4().to_string(),
        title: fields.title,
        description: fields.description,
        blinded: fields.blinded,
        access_window_start: fields.access_window_start,
        access_window_end: fields.access_window_end,
        status: StudyStatus::Draft,
        latest_published_version: None,
        next_version_number: 1,
        has_unpublished_changes: false,
        competency_quiz: None,
        created_by: created_by.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn require_edit(access: &ResolvedAccess) -> Result<(), ServiceError> {
    if access.capabilities.can_edit_draft {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

fn mark_dirty(study: &mut Study) {
    // Any edit counts, even one that leaves every field unchanged.
    study.has_unpublished_changes = true;
    study.updated_at = Utc::now();
}

/// Replaces the study's metadata and marks the draft dirty.
pub fn apply_edit(
    study: &mut Study,
    access: &ResolvedAccess,
    fields: StudyFields,
) -> Result<(), ServiceError> {
    require_edit(access)?;

    let problems = fields.problems();
    if !problems.is_empty() {
        return Err(ServiceError::validation("Study could not be saved", problems));
    }

    study.title = fields.title;
    study.description = fields.description;
    study.blinded = fields.blinded;
    study.access_window_start = fields.access_window_start;
    study.access_window_end = fields.access_window_end;
    mark_dirty(study);

    debug!("Edited study {} (phase {:?})", study.id, phase(study));
    Ok(())
}

pub fn assign_quiz(
    study: &mut Study,
    access: &ResolvedAccess,
    quiz: QuizRef,
) -> Result<(), ServiceError> {
    require_edit(access)?;

    if quiz.id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("quizId must not be empty".to_string()));
    }

    study.competency_quiz = Some(quiz);
    mark_dirty(study);
    Ok(())
}

/// Every reason the study cannot be published right now, in a stable order.
pub fn publish_problems(study: &Study) -> Vec<String> {
    let mut problems = StudyFields::from(study).problems();
    if study.competency_quiz.is_none() {
        problems.push("Quiz must be assigned".to_string());
    }
    if phase(study) == VersionPhase::PublishedCurrent {
        problems.push("Study has no unpublished changes".to_string());
    }
    problems
}

/// Publishes the draft, consuming `next_version_number`.
pub fn publish(
    study: &mut Study,
    access: &ResolvedAccess,
    published_by: &str,
) -> Result<PublishedVersion, ServiceError> {
    if !access.capabilities.can_publish {
        return Err(ServiceError::Unauthorized);
    }

    let problems = publish_problems(study);
    if !problems.is_empty() {
        return Err(ServiceError::validation("Study cannot be published", problems));
    }

    let version = study.next_version_number;
    let next_version = version.checked_add(1).ok_or_else(|| {
        error!("Version counter of study {} is exhausted", study.id);
        ServiceError::InternalServerError
    })?;
    let now = Utc::now();

    study.status = StudyStatus::Published;
    study.latest_published_version = Some(version);
    study.next_version_number = next_version;
    study.has_unpublished_changes = false;
    study.updated_at = now;

    Ok(PublishedVersion {
        version,
        title: study.title.clone(),
        published_by: published_by.to_string(),
        published_at: now,
    })
}
