use std::sync::Arc;

use validator::{Validate, ValidationErrors};

use super::filters::FilterCriteria;
use super::form::FavoriteFormValues;
use super::state::{ApplyOutcome, ListState, PageRequest, Viewport};
use super::types::FavoritePage;
use crate::app::api::{ApiClient, ApiError};
use crate::app::notice::Notice;
use crate::app::session::{SessionError, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(FavoriteFormValues),
    Update { id: i64, values: FavoriteFormValues },
    Delete(i64),
}

impl Mutation {
    fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            Self::Create(_) => "Favorite added successfully!",
            Self::Update { .. } => "Favorite updated successfully!",
            Self::Delete(_) => "Favorite deleted successfully!",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Self::Create(_) | Self::Update { .. } => "Failed to save favorite",
            Self::Delete(_) => "Failed to delete favorite",
        }
    }
}

pub struct FavoritesController<S: SessionStore + ?Sized> {
    api: ApiClient,
    session: Arc<S>,
    state: ListState,
    scroll_threshold: u32,
    notices: Vec<Notice>,
}

impl<S: SessionStore + ?Sized> FavoritesController<S> {
    pub fn new(api: ApiClient, session: Arc<S>, page_size: u32, scroll_threshold: u32) -> Self {
        Self {
            api,
            session,
            state: ListState::new(page_size),
            scroll_threshold,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn reset(&mut self) {
        self.state = ListState::new(self.state.page_size());
        self.notices.clear();
    }

    pub async fn fetch_page(&mut self, page_index: u32, reset: bool) -> ApplyOutcome {
        let request = self.state.begin_fetch(page_index, reset);
        self.run(request).await
    }

    pub async fn on_filter_change(&mut self, filters: FilterCriteria) -> ApplyOutcome {
        let request = self.state.filters_changed(filters);
        self.run(request).await
    }

    /// `None` when the scroll was ignored and no request went out.
    pub async fn on_scroll_near_bottom(&mut self) -> Option<ApplyOutcome> {
        let request = self.state.scrolled_near_bottom()?;
        Some(self.run(request).await)
    }

    pub async fn on_scroll(&mut self, viewport: Viewport) -> Option<ApplyOutcome> {
        if !viewport.is_near_bottom(self.scroll_threshold) {
            return None;
        }
        self.on_scroll_near_bottom().await
    }

    /// On failure the collection is left untouched.
    pub async fn trigger_mutation(
        &mut self,
        mutation: Mutation,
    ) -> Result<ApplyOutcome, ControllerError> {
        if let Err(error) = self.dispatch(&mutation).await {
            tracing::error!(kind = mutation.label(), error = %error, "favorite mutation failed");
            let message = match &error {
                ControllerError::Validation(_) => "Please fix the highlighted fields",
                _ => mutation.failure_message(),
            };
            self.notices.push(Notice::error(message));
            return Err(error);
        }

        tracing::info!(kind = mutation.label(), "favorite mutation succeeded");
        self.notices.push(Notice::success(mutation.success_message()));
        let request = self.state.invalidate();
        Ok(self.run(request).await)
    }

    async fn dispatch(&self, mutation: &Mutation) -> Result<(), ControllerError> {
        if let Mutation::Create(values) | Mutation::Update { values, .. } = mutation {
            values.validate()?;
        }
        let token = self.token().await?;
        match mutation {
            Mutation::Create(values) => {
                self.api.create_favorite(&token, values).await?;
            }
            Mutation::Update { id, values } => {
                self.api.update_favorite(&token, *id, values).await?;
            }
            Mutation::Delete(id) => {
                self.api.delete_favorite(&token, *id).await?;
            }
        }
        Ok(())
    }

    async fn run(&mut self, request: PageRequest) -> ApplyOutcome {
        let result = self.load(&request).await;
        self.complete(&request, result)
    }

    pub async fn load(&self, request: &PageRequest) -> Result<FavoritePage, ControllerError> {
        let token = self.token().await?;
        Ok(self.api.list_favorites(&token, &request.query).await?)
    }

    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<FavoritePage, ControllerError>,
    ) -> ApplyOutcome {
        let outcome = match result {
            Ok(page) => self.state.apply_page(request, page),
            Err(error) => {
                let outcome = self.state.apply_failure(request);
                if outcome == ApplyOutcome::Failed {
                    tracing::error!(
                        page = request.query.page,
                        error = %error,
                        "failed to load favorites"
                    );
                    self.notices.push(Notice::error("Failed to load favorites"));
                }
                outcome
            }
        };
        tracing::debug!(
            page = request.query.page,
            reset = request.reset,
            outcome = ?outcome,
            total = self.state.favorites().len(),
            "favorites page settled"
        );
        outcome
    }

    async fn token(&self) -> Result<String, ControllerError> {
        self.session
            .token()
            .await?
            .ok_or(ControllerError::NotAuthenticated)
    }
}
