//! API Server Entry Point
//!
//! Wires the document store, the access router and the HTTP stack.
//! Startup failures use `anyhow`; request errors render through
//! `kernel::error::AppError`.

use access::{
    AccessConfig, DocumentIdentityProvider, DocumentRepository, DocumentStore, IdentityProvider,
    MemoryDocumentStore, PgDocumentStore, access_router, seed_default_roles,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,access=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_access_config()?;

    // Document store: PostgreSQL when configured, in-memory otherwise
    let access = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;
            tracing::info!("Migrations completed");

            build_access(Arc::new(PgDocumentStore::new(pool)), config).await?
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using the in-memory document store");
            build_access(Arc::new(MemoryDocumentStore::new()), config).await?
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", access)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Secrets come from the environment; debug builds fall back to random ones
fn load_access_config() -> anyhow::Result<AccessConfig> {
    let mut config = if cfg!(debug_assertions) {
        AccessConfig::development()
    } else {
        AccessConfig::default()
    };

    match (env::var("COOKIE_SECRET"), env::var("TOKEN_SECRET")) {
        (Ok(cookie_secret), Ok(token_secret)) => {
            config.cookie_secret = AccessConfig::parse_secret(&cookie_secret)?;
            config.token_secret = AccessConfig::parse_secret(&token_secret)?;
        }
        _ if cfg!(debug_assertions) => {
            tracing::warn!("COOKIE_SECRET / TOKEN_SECRET not set, using random secrets");
        }
        _ => anyhow::bail!("COOKIE_SECRET and TOKEN_SECRET must be set in production"),
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

/// Seed roles, drop expired sessions and build the access router
async fn build_access<S>(store: Arc<S>, config: AccessConfig) -> anyhow::Result<Router>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let repo = DocumentRepository::new(store.clone());
    if seed_default_roles(&repo).await? {
        tracing::info!("Default roles seeded");
    }

    let identity = DocumentIdentityProvider::new(store, config.token_signer())
        .with_pepper(config.password_pepper.clone())
        .with_reset_ttl(config.reset_token_ttl);

    // Errors here should not prevent server startup
    match identity.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    Ok(access_router(repo, identity, config))
}
