use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::{devfile_handlers, handlers, user_handlers, SharedState};

pub fn create_router() -> Router<SharedState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // User devfile library
        .route("/userdevfile", post(handlers::create_user_devfile))
        .route("/userdevfile", get(handlers::list_user_devfiles))
        .route("/userdevfile/:id", get(handlers::get_user_devfile))
        .route("/userdevfile/:id", put(handlers::update_user_devfile))
        .route("/userdevfile/:id", delete(handlers::delete_user_devfile))
        // Workspace devfiles
        .route("/devfile", post(devfile_handlers::create_workspace))
        .route("/devfile", get(devfile_handlers::list_devfiles))
        .route("/devfile/:id", get(devfile_handlers::get_devfile))
        .route("/devfile/:id", delete(devfile_handlers::delete_devfile))
        // Accounts
        .route("/users", post(user_handlers::create_user))
        .route("/users/:id", get(user_handlers::get_user))
        .route("/users/:id", delete(user_handlers::delete_user))
}
