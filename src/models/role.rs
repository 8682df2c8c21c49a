// study-service/src/models/role.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Collaborator role on a study. Ordered by privilege: `Owner > Editor > Reviewer > Viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer = 0,
    Reviewer = 1,
    Editor = 2,
    Owner = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Editor, Role::Reviewer, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Editor => "EDITOR",
            Role::Reviewer => "REVIEWER",
            Role::Viewer => "VIEWER",
        }
    }

    /// Case-insensitive parse. Unknown names yield `None`, which callers treat as no access.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Some(Role::Owner),
            "EDITOR" => Some(Role::Editor),
            "REVIEWER" => Some(Role::Reviewer),
            "VIEWER" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Roles this role may hand out through invite or role change.
    pub fn grantable_roles(&self) -> Vec<Role> {
        match self {
            Role::Owner => Role::ALL.to_vec(),
            Role::Editor => vec![Role::Reviewer, Role::Viewer],
            Role::Reviewer | Role::Viewer => Vec::new(),
        }
    }

    pub fn can_grant(&self, target: Role) -> bool {
        self.grantable_roles().contains(&target)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserializes an optional role, mapping unknown names to `None` instead of failing.
pub fn deserialize_lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}

/// Actions permitted on a study. Derived from a role, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_view: bool,
    pub can_edit_draft: bool,
    pub can_publish: bool,
    pub can_invite: bool,
    pub can_manage_tasks: bool,
    pub can_export: bool,
}

impl Capabilities {
    /// Everything false, including `can_view`.
    pub const NONE: Capabilities = Capabilities {
        can_view: false,
        can_edit_draft: false,
        can_publish: false,
        can_invite: false,
        can_manage_tasks: false,
        can_export: false,
    };
}

/// Role capability table. An absent role fails closed.
pub fn capabilities_for(role: Option<Role>) -> Capabilities {
    let Some(role) = role else {
        return Capabilities::NONE;
    };

    match role {
        Role::Owner => Capabilities {
            can_view: true,
            can_edit_draft: true,
            can_publish: true,
            can_invite: true,
            can_manage_tasks: true,
            can_export: true,
        },
        Role::Editor => Capabilities {
            can_view: true,
            can_edit_draft: true,
            can_publish: false,
            can_invite: true,
            can_manage_tasks: true,
            can_export: false,
        },
        Role::Reviewer => Capabilities {
            can_view: true,
            can_edit_draft: false,
            can_publish: false,
            can_invite: false,
            can_manage_tasks: false,
            can_export: true,
        },
        Role::Viewer => Capabilities {
            can_view: true,
            ..Capabilities::NONE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_can_publish() {
        for role in Role::ALL {
            if capabilities_for(Some(role)).can_publish {
                assert_eq!(role, Role::Owner);
            }
        }
    }

    #[test]
    fn editor_cannot_grant_owner_or_editor() {
        let grantable = Role::Editor.grantable_roles();
        assert!(!grantable.contains(&Role::Owner));
        assert!(!grantable.contains(&Role::Editor));
        assert_eq!(grantable, vec![Role::Reviewer, Role::Viewer]);
    }

    #[test]
    fn roles_without_invite_grant_nothing() {
        for role in Role::ALL {
            if !capabilities_for(Some(role)).can_invite {
                assert!(role.grantable_roles().is_empty(), "{role} should grant nothing");
            }
        }
    }

    #[test]
    fn absent_role_fails_closed() {
        assert_eq!(capabilities_for(None), Capabilities::NONE);
        assert!(!capabilities_for(None).can_view);
    }

    #[test]
    fn table_matches_reviewer_and_viewer_rows() {
        let reviewer = capabilities_for(Some(Role::Reviewer));
        assert!(reviewer.can_view && reviewer.can_export);
        assert!(!reviewer.can_edit_draft && !reviewer.can_invite && !reviewer.can_manage_tasks);

        let viewer = capabilities_for(Some(Role::Viewer));
        assert_eq!(
            viewer,
            Capabilities {
                can_view: true,
                ..Capabilities::NONE
            }
        );
    }

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(Role::Owner > Role::Editor);
        assert!(Role::Editor > Role::Reviewer);
        assert!(Role::Reviewer > Role::Viewer);
    }

    #[test]
    fn serializes_in_upper_case_and_parses_leniently() {
        assert_eq!(serde_json::to_string(&Role::Reviewer).unwrap(), "\"REVIEWER\"");
        assert_eq!(Role::parse("editor"), Some(Role::Editor));
        assert_eq!(Role::parse("ADMIN"), None);

        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "deserialize_lenient_role")]
            role: Option<Role>,
        }
        let probe: Probe = serde_json::from_str(r#"{"role":"SUPERUSER"}"#).unwrap();
        assert_eq!(probe.role, None);
    }
}
