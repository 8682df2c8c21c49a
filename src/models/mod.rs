// study-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod collaborator;
pub use collaborator::*;

pub mod role;
pub use role::*;

pub mod study;
pub use study::*;

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

/// Error body shared by every failing endpoint: `{message, errors?}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

// Custom error types
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "Unauthenticated")]
    Unauthenticated,
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Forbidden")]
    Forbidden,
    #[display(fmt = "Invalid input: {}", _0)]
    InvalidInput(String),
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),
    #[display(fmt = "Validation failed: {}", message)]
    ValidationFailed { message: String, errors: Vec<String> },
    #[display(fmt = "Network failure: {}", _0)]
    NetworkFailure(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        ServiceError::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    /// Human-readable reasons carried by the error, verbatim.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            ServiceError::ValidationFailed { errors, .. } => errors.clone(),
            _ => Vec::new(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ServiceError::InternalServerError => ErrorBody {
                message: "Internal Server Error".to_string(),
                errors: None,
            },
            ServiceError::Unauthenticated => ErrorBody {
                message: "Authentication required".to_string(),
                errors: None,
            },
            ServiceError::Unauthorized => ErrorBody {
                message: "Unauthorized: your role does not allow this action".to_string(),
                errors: None,
            },
            ServiceError::Forbidden => ErrorBody {
                message: "Forbidden: you cannot grant a role above your own ceiling".to_string(),
                errors: None,
            },
            ServiceError::InvalidInput(message)
            | ServiceError::Conflict(message)
            | ServiceError::NetworkFailure(message) => ErrorBody {
                message: message.clone(),
                errors: None,
            },
            ServiceError::NotFound => ErrorBody {
                message: "Not Found".to_string(),
                errors: None,
            },
            ServiceError::ValidationFailed { message, errors } => ErrorBody {
                message: message.clone(),
                errors: Some(errors.clone()),
            },
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Unauthorized | ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::InvalidInput(_) | ServiceError::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!(self.body()))
    }
}
