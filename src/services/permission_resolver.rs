// study-service/src/services/permission_resolver.rs
use crate::models::{capabilities_for, Capabilities, Collaborator, Role};
use serde::{Deserialize, Serialize};

/// Effective access of one user on one study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccess {
    pub role: Option<Role>,
    pub capabilities: Capabilities,
}

impl ResolvedAccess {
    pub fn no_access() -> Self {
        Self {
            role: None,
            capabilities: Capabilities::NONE,
        }
    }

    pub fn has_access(&self) -> bool {
        self.role.is_some()
    }

    /// Whether this actor may hand `target` out. Users without `can_invite` grant nothing.
    pub fn can_grant(&self, target: Role) -> bool {
        match self.role {
            Some(role) => self.capabilities.can_invite && role.can_grant(target),
            None => false,
        }
    }

    pub fn grantable_roles(&self) -> Vec<Role> {
        match self.role {
            Some(role) if self.capabilities.can_invite => role.grantable_roles(),
            _ => Vec::new(),
        }
    }
}

/// Derives the acting user's role and capabilities from the collaborator list.
///
/// Always computed from the list passed in; callers must re-resolve after
/// the list changes.
pub fn resolve(user_id: &str, collaborators: &[Collaborator]) -> ResolvedAccess {
    match collaborators.iter().find(|c| c.user_id == user_id) {
        Some(collaborator) => ResolvedAccess {
            role: Some(collaborator.role),
            capabilities: capabilities_for(Some(collaborator.role)),
        },
        None => ResolvedAccess::no_access(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Researcher;

    fn collaborator(user_id: &str, role: Role) -> Collaborator {
        Collaborator::new(
            &Researcher {
                id: user_id.to_string(),
                name: user_id.to_string(),
                email: format!("{user_id}@lab.test"),
            },
            role,
        )
    }

    #[test]
    fn absent_user_has_no_access() {
        let list = vec![collaborator("ada", Role::Owner)];
        let access = resolve("grace", &list);

        assert_eq!(access, ResolvedAccess::no_access());
        assert!(!access.capabilities.can_view);
        assert!(access.grantable_roles().is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let list = vec![
            collaborator("ada", Role::Owner),
            collaborator("grace", Role::Editor),
        ];

        assert_eq!(resolve("grace", &list), resolve("grace", &list));
        assert_eq!(resolve("grace", &list).role, Some(Role::Editor));
    }

    #[test]
    fn editor_can_only_grant_lower_roles() {
        let list = vec![collaborator("grace", Role::Editor)];
        let access = resolve("grace", &list);

        assert!(access.can_grant(Role::Viewer));
        assert!(access.can_grant(Role::Reviewer));
        assert!(!access.can_grant(Role::Editor));
        assert!(!access.can_grant(Role::Owner));
    }

    #[test]
    fn role_change_is_picked_up_on_next_resolution() {
        let mut list = vec![collaborator("ada", Role::Viewer)];
        assert!(!resolve("ada", &list).capabilities.can_edit_draft);

        list[0].role = Role::Editor;
        assert!(resolve("ada", &list).capabilities.can_edit_draft);
    }
}
