// study-service/src/services/collaborator_registry.rs
//
// Invite, role change and removal of study collaborators. Every operation
// re-resolves the actor's access from the list it is about to mutate.
use crate::models::{Collaborator, InviteRequest, Researcher, Role, ServiceError};
use crate::services::permission_resolver::{self, ResolvedAccess};
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid");
}

/// Source of invite candidates.
pub trait ResearcherLookup {
    fn find_by_id(&self, user_id: &str) -> Option<Researcher>;
    fn find_by_email(&self, email: &str) -> Option<Researcher>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteTarget {
    UserId(String),
    Email(String),
}

impl InviteRequest {
    /// Exactly one of `user_id` / `email` must be set.
    pub fn target(&self) -> Result<InviteTarget, ServiceError> {
        let user_id = self.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let email = self.email.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match (user_id, email) {
            (Some(user_id), None) => Ok(InviteTarget::UserId(user_id.to_string())),
            (None, Some(email)) => {
                if !EMAIL_PATTERN.is_match(email) {
                    return Err(ServiceError::InvalidInput(format!(
                        "'{}' is not a valid email address",
                        email
                    )));
                }
                Ok(InviteTarget::Email(email.to_lowercase()))
            }
            (None, None) => Err(ServiceError::InvalidInput(
                "Either userId or email must be provided".to_string(),
            )),
            (Some(_), Some(_)) => Err(ServiceError::InvalidInput(
                "Provide exactly one of userId or email".to_string(),
            )),
        }
    }
}

/// Result of a registry mutation: the affected grant plus the refreshed list.
#[derive(Debug, Clone)]
pub struct RegistryChange {
    pub collaborator: Collaborator,
    pub collaborators: Vec<Collaborator>,
}

fn require_invite(access: &ResolvedAccess) -> Result<(), ServiceError> {
    if access.capabilities.can_invite {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

fn require_grant(access: &ResolvedAccess, role: Role) -> Result<(), ServiceError> {
    if access.can_grant(role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

fn owner_count(collaborators: &[Collaborator]) -> usize {
    collaborators.iter().filter(|c| c.role == Role::Owner).count()
}

fn last_owner_conflict() -> ServiceError {
    ServiceError::Conflict("A study must keep at least one owner".to_string())
}

pub fn invite(
    actor_id: &str,
    collaborators: &mut Vec<Collaborator>,
    request: &InviteRequest,
    directory: &dyn ResearcherLookup,
) -> Result<RegistryChange, ServiceError> {
    let access = permission_resolver::resolve(actor_id, collaborators);
    require_invite(&access)?;

    let target = request.target()?;
    require_grant(&access, request.role)?;

    let researcher = match &target {
        InviteTarget::UserId(user_id) => directory.find_by_id(user_id),
        InviteTarget::Email(email) => directory.find_by_email(email),
    }
    .ok_or_else(|| {
        warn!("Invite target not found: {:?}", target);
        ServiceError::NotFound
    })?;

    if collaborators.iter().any(|c| c.user_id == researcher.id) {
        return Err(ServiceError::Conflict(
            "User already has a role on this study".to_string(),
        ));
    }

    let collaborator = Collaborator::new(&researcher, request.role);
    collaborators.push(collaborator.clone());
    debug!(
        "Granted {} to user {} (by {})",
        collaborator.role, collaborator.user_id, actor_id
    );

    Ok(RegistryChange {
        collaborator,
        collaborators: collaborators.clone(),
    })
}

pub fn change_role(
    actor_id: &str,
    collaborators: &mut Vec<Collaborator>,
    collaborator_id: &str,
    new_role: Role,
) -> Result<RegistryChange, ServiceError> {
    let access = permission_resolver::resolve(actor_id, collaborators);
    require_invite(&access)?;
    require_grant(&access, new_role)?;

    let index = collaborators
        .iter()
        .position(|c| c.id == collaborator_id)
        .ok_or(ServiceError::NotFound)?;

    let current_role = collaborators[index].role;
    require_grant(&access, current_role)?;

    if current_role == Role::Owner && new_role != Role::Owner && owner_count(collaborators) == 1 {
        return Err(last_owner_conflict());
    }

    collaborators[index].role = new_role;
    debug!(
        "Changed role of collaborator {} from {} to {}",
        collaborator_id, current_role, new_role
    );

    Ok(RegistryChange {
        collaborator: collaborators[index].clone(),
        collaborators: collaborators.clone(),
    })
}

/// Collaborators may always remove themselves; removing others needs `can_invite`
/// and a ceiling covering the target's role.
pub fn remove(
    actor_id: &str,
    collaborators: &mut Vec<Collaborator>,
    collaborator_id: &str,
) -> Result<RegistryChange, ServiceError> {
    let access = permission_resolver::resolve(actor_id, collaborators);
    let index = collaborators.iter().position(|c| c.id == collaborator_id);

    let is_self_removal = index
        .map(|i| collaborators[i].user_id == actor_id)
        .unwrap_or(false);

    if !is_self_removal {
        require_invite(&access)?;
    }

    let index = index.ok_or(ServiceError::NotFound)?;
    let target_role = collaborators[index].role;

    if !is_self_removal {
        require_grant(&access, target_role)?;
    }

    if target_role == Role::Owner && owner_count(collaborators) == 1 {
        return Err(last_owner_conflict());
    }

    let removed = collaborators.remove(index);
    debug!("Removed collaborator {} (user {})", removed.id, removed.user_id);

    Ok(RegistryChange {
        collaborator: removed,
        collaborators: collaborators.clone(),
    })
}
