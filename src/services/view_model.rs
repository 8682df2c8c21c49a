// study-service/src/services/view_model.rs
use crate::models::{Capabilities, Collaborator, Role, Study};
use crate::services::permission_resolver;
use crate::services::publish_gate::{self, PublishGateState};
use crate::services::version_state::{self, VersionPhase};
use serde::{Deserialize, Serialize};

/// Read model handed to presentation code for one study and one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyViewModel {
    pub study: Study,
    pub current_role: Option<Role>,
    pub permissions: Capabilities,
    pub phase: VersionPhase,
    pub publish: PublishGateState,
    pub collaborators: Vec<Collaborator>,
    /// Roles the current user may offer when inviting or changing a role.
    pub grantable_roles: Vec<Role>,
}

pub fn assemble(
    user_id: &str,
    study: Study,
    collaborators: Vec<Collaborator>,
    publish_busy: bool,
) -> StudyViewModel {
    let access = permission_resolver::resolve(user_id, &collaborators);
    let publish = publish_gate::evaluate(&access.capabilities, &study, publish_busy);

    StudyViewModel {
        phase: version_state::phase(&study),
        current_role: access.role,
        permissions: access.capabilities,
        publish,
        grantable_roles: access.grantable_roles(),
        collaborators,
        study,
    }
}

impl StudyViewModel {
    /// Same view with the publish busy flag toggled; nothing else is recomputed.
    pub fn with_publish_busy(&self, busy: bool) -> StudyViewModel {
        let mut view = self.clone();
        view.publish = publish_gate::evaluate(&view.permissions, &view.study, busy);
        view
    }
}
