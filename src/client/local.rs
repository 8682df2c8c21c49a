// study-service/src/client/local.rs
use crate::client::StudyBackend;
use crate::models::{
    Collaborator, InviteRequest, Researcher, Role, ServiceError, Study, StudyFields,
    StudySummary,
};
use crate::services::StudyService;
use async_trait::async_trait;

/// In-process backend: the authoritative service called directly as `actor`.
#[derive(Clone)]
pub struct LocalStudyBackend {
    service: StudyService,
    actor: Researcher,
}

impl LocalStudyBackend {
    pub fn new(service: StudyService, actor: Researcher) -> Self {
        Self { service, actor }
    }

    pub fn actor(&self) -> &Researcher {
        &self.actor
    }
}

#[async_trait]
impl StudyBackend for LocalStudyBackend {
    async fn my_studies(&self) -> Result<Vec<StudySummary>, ServiceError> {
        self.service.my_studies(&self.actor.id)
    }

    async fn create_study(&self, fields: &StudyFields) -> Result<Study, ServiceError> {
        self.service
            .create_study(&self.actor, fields.clone())
            .map(|summary| summary.study)
    }

    async fn update_study(
        &self,
        study_id: &str,
        fields: &StudyFields,
    ) -> Result<Study, ServiceError> {
        self.service
            .update_study(&self.actor.id, study_id, fields.clone())
            .map(|summary| summary.study)
    }

    async fn publish(&self, study_id: &str) -> Result<(), ServiceError> {
        self.service.publish(&self.actor.id, study_id).map(|_| ())
    }

    async fn assign_quiz(&self, study_id: &str, quiz_id: &str) -> Result<(), ServiceError> {
        self.service.assign_quiz(&self.actor.id, study_id, quiz_id)
    }

    async fn collaborators(&self, study_id: &str) -> Result<Vec<Collaborator>, ServiceError> {
        self.service.collaborators(&self.actor.id, study_id)
    }

    async fn invite(
        &self,
        study_id: &str,
        request: &InviteRequest,
    ) -> Result<Collaborator, ServiceError> {
        self.service
            .invite(&self.actor.id, study_id, request)
            .map(|change| change.collaborator)
    }

    async fn change_role(
        &self,
        study_id: &str,
        collaborator_id: &str,
        role: Role,
    ) -> Result<Collaborator, ServiceError> {
        self.service
            .change_role(&self.actor.id, study_id, collaborator_id, role)
            .map(|change| change.collaborator)
    }

    async fn remove_collaborator(
        &self,
        study_id: &str,
        collaborator_id: &str,
    ) -> Result<(), ServiceError> {
        self.service
            .remove_collaborator(&self.actor.id, study_id, collaborator_id)
            .map(|_| ())
    }

    async fn researchers(&self) -> Result<Vec<Researcher>, ServiceError> {
        Ok(self.service.researchers())
    }
}
