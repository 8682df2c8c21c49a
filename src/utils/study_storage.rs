// study-service/src/utils/study_storage.rs
use crate::models::{Collaborator, PublishedVersion, ServiceError, Study};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const STUDIES_FILE: &str = "studies.json";

/// Everything the backend owns for one study.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub study: Study,
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub versions: Vec<PublishedVersion>,
}

/// Study records behind a single lock, optionally mirrored to `<dir>/studies.json`.
#[derive(Clone, Default)]
pub struct StudyStore {
    records: Arc<Mutex<HashMap<String, StudyRecord>>>,
    storage_dir: Option<PathBuf>,
}

impl StudyStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    // Open a persistent store, loading any records saved earlier
    pub fn open(storage_dir: &Path) -> Result<Self, ServiceError> {
        fs::create_dir_all(storage_dir).map_err(|e| {
            error!("Failed to create storage directory {:?}: {:?}", storage_dir, e);
            ServiceError::InternalServerError
        })?;

        let file = storage_dir.join(STUDIES_FILE);
        let records: HashMap<String, StudyRecord> = if file.exists() {
            let content = fs::read_to_string(&file).map_err(|e| {
                error!("Failed to read study store {:?}: {:?}", file, e);
                ServiceError::InternalServerError
            })?;
            serde_json::from_str(&content).map_err(|e| {
                error!("Failed to parse study store {:?}: {:?}", file, e);
                ServiceError::InternalServerError
            })?
        } else {
            HashMap::new()
        };

        info!("Opened study store at {:?} with {} studies", file, records.len());
        Ok(Self {
            records: Arc::new(Mutex::new(records)),
            storage_dir: Some(storage_dir.to_path_buf()),
        })
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, StudyRecord>>, ServiceError> {
        self.records.lock().map_err(|e| {
            error!("Study store lock poisoned: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    fn persist(&self, records: &HashMap<String, StudyRecord>) -> Result<(), ServiceError> {
        let Some(dir) = &self.storage_dir else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(records).map_err(|e| {
            error!("Failed to serialize study store: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let file = dir.join(STUDIES_FILE);
        fs::write(&file, json).map_err(|e| {
            error!("Failed to write study store {:?}: {:?}", file, e);
            ServiceError::InternalServerError
        })?;

        debug!("Persisted {} studies to {:?}", records.len(), file);
        Ok(())
    }

    // Store `record` in memory only once it has been written out
    fn commit(
        &self,
        records: &mut HashMap<String, StudyRecord>,
        record: StudyRecord,
    ) -> Result<(), ServiceError> {
        let study_id = record.study.id.clone();
        let previous = records.insert(study_id.clone(), record);

        if let Err(e) = self.persist(records) {
            match previous {
                Some(previous) => records.insert(study_id, previous),
                None => records.remove(&study_id),
            };
            return Err(e);
        }
        Ok(())
    }

    pub fn insert(&self, record: StudyRecord) -> Result<(), ServiceError> {
        let mut records = self.guard()?;
        self.commit(&mut records, record)
    }

    pub fn get(&self, study_id: &str) -> Result<StudyRecord, ServiceError> {
        self.guard()?
            .get(study_id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    /// Applies `change` to a copy of the record; the copy replaces the stored
    /// record only if `change` succeeds and the store could be written.
    pub fn update<T>(
        &self,
        study_id: &str,
        change: impl FnOnce(&mut StudyRecord) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut records = self.guard()?;
        let mut draft = records.get(study_id).cloned().ok_or(ServiceError::NotFound)?;

        let outcome = change(&mut draft)?;
        self.commit(&mut records, draft)?;
        Ok(outcome)
    }

    // All records the user holds a grant on, oldest first
    pub fn records_for_user(&self, user_id: &str) -> Result<Vec<StudyRecord>, ServiceError> {
        let mut records: Vec<StudyRecord> = self
            .guard()?
            .values()
            .filter(|r| r.collaborators.iter().any(|c| c.user_id == user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.study.created_at.cmp(&b.study.created_at));
        Ok(records)
    }
}
