pub mod auth;
pub mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::api::types::{AuthResponse, User};
use crate::app::storage::StorageError;

pub use store::{MemorySessionStore, SqliteSessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: Some(response.user),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("stored user is not valid json: {0}")]
    CorruptUser(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self) -> Result<Option<Session>, SessionError>;

    async fn set(&self, session: &Session) -> Result<(), SessionError>;

    async fn clear(&self) -> Result<(), SessionError>;

    async fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.get().await?.map(|session| session.token))
    }
}
