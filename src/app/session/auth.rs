use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::{Session, SessionError, SessionStore};
use crate::app::api::types::{Credentials, SignupRequest};
use crate::app::api::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(Session),
    LoginRequired,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Server-provided message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) => error
                .server_message()
                .map(ToString::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            Self::Validation(errors) => crate::app::favorites::form::field_errors(errors)
                .into_iter()
                .map(|error| error.to_string())
                .collect::<Vec<_>>()
                .join("; "),
            Self::Session(_) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SignupForm {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// A token the backend rejects is cleared.
pub async fn check_session<S>(api: &ApiClient, store: &S) -> Result<AuthState, SessionError>
where
    S: SessionStore + ?Sized,
{
    let Some(session) = store.get().await? else {
        return Ok(AuthState::LoginRequired);
    };

    match api.validate_session(&session.token).await {
        Ok(()) => Ok(AuthState::Authenticated(session)),
        Err(error) => {
            tracing::warn!(error = %error, "stored token rejected, clearing session");
            store.clear().await?;
            Ok(AuthState::LoginRequired)
        }
    }
}

pub async fn signup<S>(api: &ApiClient, store: &S, form: &SignupForm) -> Result<Session, AuthError>
where
    S: SessionStore + ?Sized,
{
    form.validate()?;
    let request = SignupRequest {
        name: form
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };
    let session = Session::from(api.signup(&request).await?);
    store.set(&session).await?;
    tracing::info!(email = %request.email, "account created");
    Ok(session)
}

pub async fn login<S>(
    api: &ApiClient,
    store: &S,
    credentials: &Credentials,
) -> Result<Session, AuthError>
where
    S: SessionStore + ?Sized,
{
    let session = Session::from(api.login(credentials).await?);
    store.set(&session).await?;
    tracing::info!(email = %credentials.email, "logged in");
    Ok(session)
}

pub async fn logout<S>(store: &S) -> Result<(), SessionError>
where
    S: SessionStore + ?Sized,
{
    store.clear().await?;
    tracing::info!("logged out");
    Ok(())
}
