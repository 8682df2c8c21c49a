// study-service/src/utils/user_directory.rs
use crate::models::{Researcher, ServiceError};
use crate::services::ResearcherLookup;
use log::{error, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Researchers who can be invited onto studies, keyed by user id.
#[derive(Clone, Default)]
pub struct UserDirectory {
    researchers: Arc<Mutex<BTreeMap<String, Researcher>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_researchers(researchers: impl IntoIterator<Item = Researcher>) -> Self {
        let directory = Self::new();
        for researcher in researchers {
            directory.upsert(researcher);
        }
        directory
    }

    // Seed the directory from a JSON array of researchers
    pub fn load_from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read researchers file {:?}: {:?}", path, e);
            ServiceError::InternalServerError
        })?;

        let researchers: Vec<Researcher> = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse researchers file {:?}: {:?}", path, e);
            ServiceError::InternalServerError
        })?;

        info!("Loaded {} researchers from {:?}", researchers.len(), path);
        Ok(Self::with_researchers(researchers))
    }

    fn guard(&self) -> MutexGuard<'_, BTreeMap<String, Researcher>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.researchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn upsert(&self, researcher: Researcher) {
        self.guard().insert(researcher.id.clone(), researcher);
    }

    pub fn list(&self) -> Vec<Researcher> {
        let mut researchers: Vec<Researcher> = self.guard().values().cloned().collect();
        researchers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        researchers
    }
}

impl ResearcherLookup for UserDirectory {
    fn find_by_id(&self, user_id: &str) -> Option<Researcher> {
        self.guard().get(user_id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Researcher> {
        self.guard()
            .values()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn researcher(id: &str, name: &str) -> Researcher {
        Researcher {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@lab.test"),
        }
    }

    #[test]
    fn lists_researchers_by_name() {
        let directory = UserDirectory::with_researchers(vec![
            researcher("2", "zed"),
            researcher("1", "Ada"),
        ]);
        let names: Vec<String> = directory.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Ada".to_string(), "zed".to_string()]);
    }

    #[test]
    fn email_lookup_ignores_case() {
        let directory = UserDirectory::with_researchers(vec![researcher("ada", "Ada")]);
        assert_eq!(
            directory.find_by_email("ADA@LAB.TEST").map(|r| r.id),
            Some("ada".to_string())
        );
        assert!(directory.find_by_id("nobody").is_none());
    }

    #[test]
    fn upsert_replaces_existing_entry() {
        let directory = UserDirectory::with_researchers(vec![researcher("ada", "Ada")]);
        directory.upsert(researcher("ada", "Ada Lovelace"));
        assert_eq!(directory.list().len(), 1);
        assert_eq!(directory.find_by_id("ada").unwrap().name, "Ada Lovelace");
    }
}
