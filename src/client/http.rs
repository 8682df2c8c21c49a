// study-service/src/client/http.rs
use crate::client::StudyBackend;
use crate::models::{
    ChangeRoleRequest, Collaborator, ErrorBody, InviteRequest, Researcher, Role, ServiceError,
    Study, StudyFields, StudySummary,
};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Study API over HTTP, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpStudyBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpStudyBackend {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                warn!("Study API request failed: {}", e);
                ServiceError::NetworkFailure(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are best-effort; a missing or garbled body still maps by status.
        let body = response.json::<ErrorBody>().await.ok();
        debug!("Study API answered {} with {:?}", status, body);
        Err(error_from_status(status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ServiceError::NetworkFailure(format!("Malformed response body: {}", e)))
    }
}

/// Maps an unsuccessful API response back onto the shared error kinds.
pub fn error_from_status(status: StatusCode, body: Option<ErrorBody>) -> ServiceError {
    let message = body
        .as_ref()
        .map(|b| b.message.clone())
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Unauthenticated,
        StatusCode::FORBIDDEN if message.starts_with("Unauthorized") => ServiceError::Unauthorized,
        StatusCode::FORBIDDEN => ServiceError::Forbidden,
        StatusCode::NOT_FOUND => ServiceError::NotFound,
        StatusCode::CONFLICT => ServiceError::Conflict(message),
        s if s.is_client_error() => match body.and_then(|b| b.errors) {
            Some(errors) => ServiceError::ValidationFailed { message, errors },
            None => ServiceError::InvalidInput(message),
        },
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ServiceError::NetworkFailure(message)
        }
        _ => ServiceError::InternalServerError,
    }
}

#[async_trait]
impl StudyBackend for HttpStudyBackend {
    async fn my_studies(&self) -> Result<Vec<StudySummary>, ServiceError> {
        self.send_json(self.client.get(self.url("/studies/my-studies")))
            .await
    }

    async fn create_study(&self, fields: &StudyFields) -> Result<Study, ServiceError> {
        self.send_json(self.client.post(self.url("/studies")).json(fields))
            .await
    }

    async fn update_study(
        &self,
        study_id: &str,
        fields: &StudyFields,
    ) -> Result<Study, ServiceError> {
        let url = self.url(&format!("/studies/{}", study_id));
        self.send_json(self.client.put(url).json(fields)).await
    }

    async fn publish(&self, study_id: &str) -> Result<(), ServiceError> {
        let url = self.url(&format!("/studies/{}/publish", study_id));
        self.send(self.client.post(url)).await.map(|_| ())
    }

    async fn assign_quiz(&self, study_id: &str, quiz_id: &str) -> Result<(), ServiceError> {
        let url = self.url(&format!("/studies/{}/assign-quiz", study_id));
        self.send(self.client.post(url).json(&json!({ "quizId": quiz_id })))
            .await
            .map(|_| ())
    }

    async fn collaborators(&self, study_id: &str) -> Result<Vec<Collaborator>, ServiceError> {
        let url = self.url(&format!("/studies/{}/collaborators", study_id));
        self.send_json(self.client.get(url)).await
    }

    async fn invite(
        &self,
        study_id: &str,
        request: &InviteRequest,
    ) -> Result<Collaborator, ServiceError> {
        let url = self.url(&format!("/studies/{}/collaborators", study_id));
        self.send_json(self.client.post(url).json(request)).await
    }

    async fn change_role(
        &self,
        study_id: &str,
        collaborator_id: &str,
        role: Role,
    ) -> Result<Collaborator, ServiceError> {
        let url = self.url(&format!(
            "/studies/{}/collaborators/{}",
            study_id, collaborator_id
        ));
        self.send_json(self.client.patch(url).json(&ChangeRoleRequest { role }))
            .await
    }

    async fn remove_collaborator(
        &self,
        study_id: &str,
        collaborator_id: &str,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!(
            "/studies/{}/collaborators/{}",
            study_id, collaborator_id
        ));
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn researchers(&self) -> Result<Vec<Researcher>, ServiceError> {
        self.send_json(self.client.get(self.url("/users/researchers")))
            .await
    }
}
