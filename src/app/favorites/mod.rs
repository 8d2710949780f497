pub mod controller;
pub mod debounce;
pub mod filters;
pub mod form;
pub mod state;
pub mod types;

pub use controller::{ControllerError, FavoritesController, Mutation};
pub use filters::{FilterCriteria, PageQuery};
pub use form::FavoriteFormValues;
pub use state::{ApplyOutcome, ListState, PageRequest, Viewport};
pub use types::{FavoriteEntry, FavoriteKind, FavoritePage};
