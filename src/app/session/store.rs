use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Session, SessionError, SessionStore};
use crate::app::api::types::User;
use crate::app::storage::SettingsRepository;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.read().await.clone())
    }

    async fn set(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.session.write().await = None;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    repository: SettingsRepository,
}

impl SqliteSessionStore {
    pub fn new(repository: SettingsRepository) -> Self {
        Self { repository }
    }

    pub async fn connect(database_url: &str) -> Result<Self, SessionError> {
        let repository = SettingsRepository::connect(database_url).await?;
        Ok(Self::new(repository))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.repository.get_setting(TOKEN_KEY).await? else {
            return Ok(None);
        };
        if token.trim().is_empty() {
            return Ok(None);
        }
        let user = match self.repository.get_setting(USER_KEY).await? {
            Some(raw) => Some(serde_json::from_str::<User>(&raw)?),
            None => None,
        };
        Ok(Some(Session { token, user }))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionError> {
        match &session.user {
            Some(user) => {
                let serialized = serde_json::to_string(user)?;
                self.repository
                    .set_settings(&[
                        (TOKEN_KEY, session.token.as_str()),
                        (USER_KEY, serialized.as_str()),
                    ])
                    .await?;
            }
            None => {
                self.repository.delete_settings(&[USER_KEY]).await?;
                self.repository.set_setting(TOKEN_KEY, &session.token).await?;
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.repository.delete_settings(&[TOKEN_KEY, USER_KEY]).await?;
        Ok(())
    }
}
