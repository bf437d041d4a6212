use learn_portal::{
    AppState,
    auth::{AuthState, SupabaseAuthProvider},
    cache::{self, RoleCache},
    config::{AppConfig, Env},
    create_router,
    repository::{ArticleState, FsArticleStore},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for initializing
/// all core components: Configuration, Logging, Content Store, Auth Provider,
/// Role Cache, and the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() implements the fail-fast principle for missing Production secrets.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Sets the default log level. It prioritizes the RUST_LOG environment variable,
    // falling back to sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "learn_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    // The structured logging format is dynamically selected based on the APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Content Store Initialization
    // The article repository is read-only over the mounted content directory;
    // every request re-reads and re-parses, so there is nothing to warm up.
    let articles = Arc::new(FsArticleStore::new(config.content_dir.clone())) as ArticleState;
    tracing::info!("Serving articles from {:?}", config.content_dir);

    // 5. Auth Provider Initialization (Supabase)
    let auth = Arc::new(SupabaseAuthProvider::new(config.clone())) as AuthState;

    // 6. Role Cache + Background Sweep
    // The cache is constructed explicitly here and injected into the state; the
    // sweeper task runs for the life of the process on a fixed interval equal
    // to the cache TTL.
    let roles = Arc::new(RoleCache::new());
    cache::spawn_sweeper(roles.clone());

    // 7. Unified State Assembly
    let app_state = AppState {
        articles,
        auth,
        roles,
        config,
    };

    // 8. Router and Server Startup
    let app = create_router(app_state);

    // Binds the TCP listener and initiates the HTTP server.
    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: failed to bind 0.0.0.0:3000");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    // The long-running Axum server process.
    axum::serve(listener, app)
        .await
        .expect("FATAL: server exited with an error");
}
