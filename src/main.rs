use std::sync::Arc;

use interview_tracker_auth::{
    auth::{seed, AuthService, InMemoryUserStore, PasswordService, PgUserStore, TokenService, UserStore},
    config::AppConfig,
    create_router, db, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("interview_tracker_auth=info,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Interview Tracker Auth - Starting...");

    // Missing or malformed signing configuration is fatal
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let tokens = Arc::new(TokenService::new(&config.jwt));
    let auth = Arc::new(AuthService::new(
        store,
        PasswordService::default(),
        tokens.clone(),
    ));

    if let Some(admin) = &config.admin {
        seed::ensure_admin(&auth, admin)
            .await
            .expect("Failed to seed administrator account");
    }

    let app = create_router(AppState { auth, tokens });

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
