// study-service/src/models/collaborator.rs
use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// A user's grant on a single study
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub added_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn new(researcher: &Researcher, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: researcher.id.clone(),
            name: researcher.name.clone(),
            email: researcher.email.clone(),
            role,
            added_at: Utc::now(),
        }
    }
}

// Request to invite a collaborator; exactly one of user_id / email
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

impl InviteRequest {
    pub fn by_user_id(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
            role,
        }
    }

    pub fn by_email(email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
            role,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// Invite candidate as listed by the researcher directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Researcher {
    pub id: String,
    pub name: String,
    pub email: String,
}
