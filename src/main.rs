use devfile_service::config::{AppConfig, StorageBackend};
use devfile_service::{build_app_state, connect_stores, seed, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info) // Default to Info for everything
        .filter_module("sqlx", LevelFilter::Warn) // Suppress sqlx Debug logs
        .init();

    println!("Devfile Service");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    match config.database.backend {
        StorageBackend::Postgres => println!("Connecting to PostgreSQL and running migrations..."),
        StorageBackend::Memory => println!("Using in-memory storage"),
    }
    let stores = connect_stores(&config).await?;

    // Load seed data for development (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(&stores).await?;
        println!("Seed data loaded successfully");
    }

    let state = build_app_state(stores, &config)?;
    serve(state, &config).await?;

    Ok(())
}
