// study-service/src/client/mod.rs
//
// Client side of the study API: a backend abstraction and the per-screen
// workspace store built on top of it.
use crate::models::{
    Collaborator, InviteRequest, Researcher, Role, ServiceError, Study, StudyFields,
    StudySummary,
};
use async_trait::async_trait;

pub mod http;
pub mod local;
pub mod workspace;

pub use http::HttpStudyBackend;
pub use local::LocalStudyBackend;
pub use workspace::{Notice, NoticeKind, StudyWorkspace, WorkspaceSnapshot};

/// One method per study API endpoint, always on behalf of a single signed-in user.
#[async_trait]
pub trait StudyBackend: Send + Sync {
    async fn my_studies(&self) -> Result<Vec<StudySummary>, ServiceError>;

    async fn create_study(&self, fields: &StudyFields) -> Result<Study, ServiceError>;

    async fn update_study(
        &self,
        study_id: &str,
        fields: &StudyFields,
    ) -> Result<Study, ServiceError>;

    async fn publish(&self, study_id: &str) -> Result<(), ServiceError>;

    async fn assign_quiz(&self, study_id: &str, quiz_id: &str) -> Result<(), ServiceError>;

    async fn collaborators(&self, study_id: &str) -> Result<Vec<Collaborator>, ServiceError>;

    async fn invite(
        &self,
        study_id: &str,
        request: &InviteRequest,
    ) -> Result<Collaborator, ServiceError>;

    async fn change_role(
        &self,
        study_id: &str,
        collaborator_id: &str,
        role: Role,
    ) -> Result<Collaborator, ServiceError>;

    async fn remove_collaborator(
        &self,
        study_id: &str,
        collaborator_id: &str,
    ) -> Result<(), ServiceError>;

    async fn researchers(&self) -> Result<Vec<Researcher>, ServiceError>;
}
