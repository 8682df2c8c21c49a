// study-service/src/services/publish_gate.rs
use crate::models::{Capabilities, ServiceError, Study, StudyStatus};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishGateState {
    pub can_show_publish_button: bool,
    pub is_publish_enabled: bool,
    pub is_busy: bool,
}

pub fn evaluate(capabilities: &Capabilities, study: &Study, busy: bool) -> PublishGateState {
    let can_show_publish_button = capabilities.can_publish;
    let has_something_to_publish =
        study.status != StudyStatus::Published || study.has_unpublished_changes;

    PublishGateState {
        can_show_publish_button,
        is_publish_enabled: can_show_publish_button && has_something_to_publish && !busy,
        is_busy: busy,
    }
}

/// Studies with a publish request currently in flight.
///
/// At most one publish per study id; different studies never block each other.
#[derive(Clone, Default)]
pub struct PublishTracker {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl PublishTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `study_id` busy. Fails with `Conflict` if it already is.
    pub fn try_begin(&self, study_id: &str) -> Result<PublishTicket, ServiceError> {
        let mut in_flight = self.in_flight.lock().map_err(|e| {
            warn!("Publish tracker lock poisoned: {:?}", e);
            ServiceError::InternalServerError
        })?;

        if !in_flight.insert(study_id.to_string()) {
            debug!("Publish already in flight for study {}", study_id);
            return Err(ServiceError::Conflict(
                "publish already in progress".to_string(),
            ));
        }

        Ok(PublishTicket {
            study_id: study_id.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_busy(&self, study_id: &str) -> bool {
        self.in_flight
            .lock()
            .map(|in_flight| in_flight.contains(study_id))
            .unwrap_or(false)
    }
}

/// Clears the busy flag when dropped, whatever the outcome of the request.
pub struct PublishTicket {
    study_id: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for PublishTicket {
    fn drop(&mut self) {
        match self.in_flight.lock() {
            Ok(mut in_flight) => {
                in_flight.remove(&self.study_id);
            }
            Err(e) => warn!("Could not release publish flag for {}: {:?}", self.study_id, e),
        }
    }
}
