use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::types::{AuthResponse, Credentials, ErrorBody, SignupRequest};
use crate::app::favorites::filters::PageQuery;
use crate::app::favorites::form::FavoriteFormValues;
use crate::app::favorites::types::FavoritePage;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {status}")]
    HttpStatus {
        status: u16,
        message: Option<String>,
    },
    #[error("invalid api base url: {0}")]
    BaseUrl(String),
}

impl ApiError {
    /// The `error` field of the response body, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::HttpStatus {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_favorites(
        &self,
        token: &str,
        query: &PageQuery,
    ) -> Result<FavoritePage, ApiError> {
        let request = self
            .client
            .get(self.endpoint("/api/favorites"))
            .bearer_auth(token)
            .query(&query.params());
        read_json(request).await
    }

    pub async fn create_favorite(
        &self,
        token: &str,
        values: &FavoriteFormValues,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoint("/api/favorites"))
            .bearer_auth(token)
            .json(values);
        send(request).await?;
        Ok(())
    }

    pub async fn update_favorite(
        &self,
        token: &str,
        id: i64,
        values: &FavoriteFormValues,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.endpoint(&format!("/api/favorites/{id}")))
            .bearer_auth(token)
            .json(values);
        send(request).await?;
        Ok(())
    }

    pub async fn delete_favorite(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.endpoint(&format!("/api/favorites/{id}")))
            .bearer_auth(token);
        send(request).await?;
        Ok(())
    }

    pub async fn validate_session(&self, token: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .get(self.endpoint("/api/auth/validate"))
            .bearer_auth(token);
        send(request).await?;
        Ok(())
    }

    pub async fn signup(&self, signup: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let request = self
            .client
            .post(self.endpoint("/api/auth/signup"))
            .json(signup);
        read_json(request).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let request = self
            .client
            .post(self.endpoint("/api/auth/login"))
            .json(credentials);
        read_json(request).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.trim().is_empty());
    Err(ApiError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = send(request).await?;
    Ok(response.json::<T>().await?)
}
