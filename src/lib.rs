pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

use std::sync::Arc;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::api::links::LinkBuilder;
use crate::api::{AppState, SharedState};
use crate::config::{AppConfig, StorageBackend};
use crate::events::EventBus;
use crate::logic::{
    DevfileManager, FileContentProvider, LocalWorkspaceFactory, RemoveDevfilesBeforeUserRemoved,
    UrlFileContentProvider, UserDevfileManager, UserRemovalService, WorkspaceFactory,
};
use crate::store::{PostgresStore, Stores};

// Export API types
pub use api::routes;

// Export error types
pub use error::{DevfileError, Result};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DevfileDao, InMemoryStore, UserStore};

/// Name of the hook removing a user's library devfiles.
pub const USER_DEVFILES_HOOK: &str = "user-devfiles";
/// Name of the hook removing a user's workspace devfiles.
pub const WORKSPACE_DEVFILES_HOOK: &str = "workspace-devfiles";

/// Opens the configured storage backend, running migrations for PostgreSQL.
pub async fn connect_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.database.backend {
        StorageBackend::Memory => Ok(Stores::in_memory()),
        StorageBackend::Postgres => {
            let store =
                PostgresStore::new(&config.database_url(), config.max_connections()).await?;
            store.migrate().await?;
            Ok(Stores::postgres(&store))
        }
    }
}

/// Composes managers, hooks and collaborators over `stores`.
pub fn build_app_state(stores: Stores, config: &AppConfig) -> anyhow::Result<SharedState> {
    let content = UrlFileContentProvider::new(config.devfile.content_base_url.clone())?;
    Ok(build_app_state_with(
        stores,
        config,
        Arc::new(content),
        Arc::new(LocalWorkspaceFactory::new()),
    ))
}

pub fn build_app_state_with(
    stores: Stores,
    config: &AppConfig,
    content: Arc<dyn FileContentProvider>,
    workspaces: Arc<dyn WorkspaceFactory>,
) -> SharedState {
    let page_size = config.devfile.cascade_page_size;
    let user_removal = Arc::new(UserRemovalService::new(Arc::clone(&stores.users)));
    user_removal.subscribe(
        USER_DEVFILES_HOOK,
        Arc::new(RemoveDevfilesBeforeUserRemoved::new(
            Arc::clone(&stores.user_devfiles),
            page_size,
        )),
    );
    user_removal.subscribe(
        WORKSPACE_DEVFILES_HOOK,
        Arc::new(RemoveDevfilesBeforeUserRemoved::new(
            Arc::clone(&stores.devfiles),
            page_size,
        )),
    );

    Arc::new(AppState {
        user_devfiles: UserDevfileManager::new(stores.user_devfiles, EventBus::new()),
        devfiles: DevfileManager::new(stores.devfiles, workspaces, EventBus::new()),
        users: stores.users,
        user_removal,
        content,
        links: LinkBuilder::new(config.server.api_endpoint.as_deref()),
        default_max_items: config.devfile.default_max_items,
    })
}

pub fn create_app(state: SharedState) -> Router {
    api::routes::create_router().with_state(state)
}

/// Serves `state` until Ctrl-C, then unsubscribes the removal hooks.
pub async fn serve(state: SharedState, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Devfile service running on http://{}", bind_address);

    axum::serve(listener, create_app(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.user_removal.unsubscribe_all();
    info!("Devfile service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    let stores = connect_stores(&config).await?;
    let state = build_app_state(stores, &config)?;

    serve(state, &config).await
}
