pub mod body;
pub mod devfile_handlers;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod links;
pub mod routes;
pub mod user_extractor;
pub mod user_handlers;

pub use dto::*;
pub use error::*;
pub use routes::*;

use std::sync::Arc;

use crate::api::links::LinkBuilder;
use crate::logic::{DevfileManager, FileContentProvider, UserDevfileManager, UserRemovalService};
use crate::store::UserStore;

/// Everything the handlers need, composed once at startup.
pub struct AppState {
    pub user_devfiles: UserDevfileManager,
    pub devfiles: DevfileManager,
    pub users: Arc<dyn UserStore>,
    pub user_removal: Arc<UserRemovalService>,
    /// Wrapped in a per-request cache by the workspace handler.
    pub content: Arc<dyn FileContentProvider>,
    pub links: LinkBuilder,
    pub default_max_items: usize,
}

pub type SharedState = Arc<AppState>;
