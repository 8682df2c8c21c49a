// study-service/src/services/study_service.rs
//
// Authoritative study operations. Routes and the in-process client backend
// both go through here, so every rule is enforced in one place.
use crate::models::{
    Collaborator, InviteRequest, PublishedVersion, QuizRef, Researcher, Role, ServiceError,
    StudyFields, StudySummary,
};
use crate::services::collaborator_registry::{self, RegistryChange};
use crate::services::permission_resolver::{self, ResolvedAccess};
use crate::services::version_state;
use crate::utils::study_storage::{StudyRecord, StudyStore};
use crate::utils::user_directory::UserDirectory;
use log::info;

#[derive(Clone, Default)]
pub struct StudyService {
    store: StudyStore,
    directory: UserDirectory,
}

fn summarize(record: StudyRecord, user_id: &str) -> StudySummary {
    let access = permission_resolver::resolve(user_id, &record.collaborators);
    StudySummary {
        study: record.study,
        permissions: access.capabilities,
        current_role: access.role,
    }
}

fn require_view(access: &ResolvedAccess) -> Result<(), ServiceError> {
    if access.capabilities.can_view {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

impl StudyService {
    pub fn new(store: StudyStore, directory: UserDirectory) -> Self {
        Self { store, directory }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn researchers(&self) -> Vec<Researcher> {
        self.directory.list()
    }

    /// Creates a draft owned by `actor`, who also becomes a known researcher.
    pub fn create_study(
        &self,
        actor: &Researcher,
        fields: StudyFields,
    ) -> Result<StudySummary, ServiceError> {
        let problems = fields.problems();
        if !problems.is_empty() {
            return Err(ServiceError::validation("Study could not be created", problems));
        }

        self.directory.upsert(actor.clone());

        let record = StudyRecord {
            study: version_state::new_draft(fields, &actor.id),
            collaborators: vec![Collaborator::new(actor, Role::Owner)],
            versions: Vec::new(),
        };
        self.store.insert(record.clone())?;

        info!("Study {} created by {}", record.study.id, actor.id);
        Ok(summarize(record, &actor.id))
    }

    pub fn my_studies(&self, user_id: &str) -> Result<Vec<StudySummary>, ServiceError> {
        Ok(self
            .store
            .records_for_user(user_id)?
            .into_iter()
            .map(|record| summarize(record, user_id))
            .collect())
    }

    pub fn get_study(&self, user_id: &str, study_id: &str) -> Result<StudySummary, ServiceError> {
        let record = self.store.get(study_id)?;
        require_view(&permission_resolver::resolve(user_id, &record.collaborators))?;
        Ok(summarize(record, user_id))
    }

    pub fn update_study(
        &self,
        user_id: &str,
        study_id: &str,
        fields: StudyFields,
    ) -> Result<StudySummary, ServiceError> {
        let record = self.store.update(study_id, |record| {
            let access = permission_resolver::resolve(user_id, &record.collaborators);
            version_state::apply_edit(&mut record.study, &access, fields)?;
            Ok(record.clone())
        })?;
        Ok(summarize(record, user_id))
    }

    pub fn assign_quiz(
        &self,
        user_id: &str,
        study_id: &str,
        quiz_id: &str,
    ) -> Result<(), ServiceError> {
        self.store.update(study_id, |record| {
            let access = permission_resolver::resolve(user_id, &record.collaborators);
            let quiz = QuizRef {
                id: quiz_id.trim().to_string(),
                title: None,
            };
            version_state::assign_quiz(&mut record.study, &access, quiz)
        })
    }

    pub fn publish(&self, user_id: &str, study_id: &str) -> Result<PublishedVersion, ServiceError> {
        let published = self.store.update(study_id, |record| {
            let access = permission_resolver::resolve(user_id, &record.collaborators);
            let published = version_state::publish(&mut record.study, &access, user_id)?;
            record.versions.push(published.clone());
            Ok(published)
        })?;

        info!("Study {} published as version {}", study_id, published.version);
        Ok(published)
    }

    pub fn versions(
        &self,
        user_id: &str,
        study_id: &str,
    ) -> Result<Vec<PublishedVersion>, ServiceError> {
        let record = self.store.get(study_id)?;
        require_view(&permission_resolver::resolve(user_id, &record.collaborators))?;
        Ok(record.versions)
    }

    pub fn collaborators(
        &self,
        user_id: &str,
        study_id: &str,
    ) -> Result<Vec<Collaborator>, ServiceError> {
        let record = self.store.get(study_id)?;
        require_view(&permission_resolver::resolve(user_id, &record.collaborators))?;
        Ok(record.collaborators)
    }

    pub fn invite(
        &self,
        user_id: &str,
        study_id: &str,
        request: &InviteRequest,
    ) -> Result<RegistryChange, ServiceError> {
        self.store.update(study_id, |record| {
            collaborator_registry::invite(
                user_id,
                &mut record.collaborators,
                request,
                &self.directory,
            )
        })
    }

    pub fn change_role(
        &self,
        user_id: &str,
        study_id: &str,
        collaborator_id: &str,
        role: Role,
    ) -> Result<RegistryChange, ServiceError> {
        self.store.update(study_id, |record| {
            collaborator_registry::change_role(
                user_id,
                &mut record.collaborators,
                collaborator_id,
                role,
            )
        })
    }

    pub fn remove_collaborator(
        &self,
        user_id: &str,
        study_id: &str,
        collaborator_id: &str,
    ) -> Result<RegistryChange, ServiceError> {
        self.store.update(study_id, |record| {
            collaborator_registry::remove(user_id, &mut record.collaborators, collaborator_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudyStatus;
    use crate::services::ResearcherLookup;

    fn researcher(id: &str) -> Researcher {
        Researcher {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@lab.test"),
        }
    }

    fn service() -> StudyService {
        StudyService::new(
            StudyStore::in_memory(),
            UserDirectory::with_researchers(vec![researcher("grace"), researcher("linus")]),
        )
    }

    fn fields(title: &str) -> StudyFields {
        StudyFields {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn creator_becomes_sole_owner() {
        let service = service();
        let created = service.create_study(&researcher("ada"), fields("First")).unwrap();

        assert_eq!(created.current_role, Some(Role::Owner));
        assert!(created.permissions.can_publish);
        let list = service.collaborators("ada", &created.study.id).unwrap();
        assert_eq!(list.len(), 1);
        assert!(service.directory().find_by_id("ada").is_some());
    }

    #[test]
    fn failed_publish_keeps_draft_and_counters() {
        let service = service();
        let created = service.create_study(&researcher("ada"), fields("Quizless")).unwrap();
        let id = created.study.id;

        let err = service.publish("ada", &id).unwrap_err();
        assert_eq!(err.reasons(), vec!["Quiz must be assigned".to_string()]);

        let study = service.get_study("ada", &id).unwrap().study;
        assert_eq!(study.status, StudyStatus::Draft);
        assert_eq!(study.next_version_number, 1);
        assert!(service.versions("ada", &id).unwrap().is_empty());
    }

    #[test]
    fn publish_records_version_history() {
        let service = service();
        let id = service
            .create_study(&researcher("ada"), fields("Versioned"))
            .unwrap()
            .study
            .id;

        service.assign_quiz("ada", &id, "quiz-1").unwrap();
        service.publish("ada", &id).unwrap();
        service.update_study("ada", &id, fields("Versioned v2")).unwrap();
        service.publish("ada", &id).unwrap();

        let versions = service.versions("ada", &id).unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(versions[1].title, "Versioned v2");
    }

    #[test]
    fn outsiders_cannot_read_collaborators() {
        let service = service();
        let id = service
            .create_study(&researcher("ada"), fields("Private"))
            .unwrap()
            .study
            .id;

        assert_eq!(
            service.collaborators("linus", &id).unwrap_err(),
            ServiceError::Unauthorized
        );
        assert!(service.my_studies("linus").unwrap().is_empty());
    }

    #[test]
    fn invited_editor_sees_study_with_editor_capabilities() {
        let service = service();
        let id = service
            .create_study(&researcher("ada"), fields("Shared"))
            .unwrap()
            .study
            .id;

        service
            .invite("ada", &id, &InviteRequest::by_user_id("grace", Role::Editor))
            .unwrap();

        let mine = service.my_studies("grace").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].current_role, Some(Role::Editor));
        assert!(mine[0].permissions.can_edit_draft);
        assert!(!mine[0].permissions.can_publish);
    }
}
