//! Authentication and user administration for the HR interview tracker.
//!
//! Users log in with email and password and receive a 24 hour bearer token;
//! administrators create, list, fetch and deactivate HR and Interviewer
//! accounts.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    handlers, require_admin, AuthResponse, AuthService, CreateUserRequest, LoginRequest,
    MeResponse, Role, TokenService, UserResponse,
};
use error::{ApiResponse, ErrorResponse};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_handler,
        handlers::me_handler,
        handlers::create_user_handler,
        handlers::get_all_users_handler,
        handlers::get_user_by_id_handler,
        handlers::deactivate_user_handler,
    ),
    components(
        schemas(LoginRequest, CreateUserRequest, AuthResponse, UserResponse, MeResponse, Role, ErrorResponse)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and caller identity"),
        (name = "users", description = "Admin-only user administration")
    ),
    info(
        title = "HR Interview Tracker Auth API",
        version = "0.1.0",
        description = "Authentication and user management for the interview tracker"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

async fn health() -> ApiResponse<()> {
    ApiResponse::message("ok")
}

/// Routes under /api/auth, with the admin guard on user administration
fn auth_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/create-user", post(handlers::create_user_handler))
        .route("/users", get(handlers::get_all_users_handler))
        .route(
            "/users/:id",
            get(handlers::get_user_by_id_handler).delete(handlers::deactivate_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/login", post(handlers::login_handler))
        .route("/me", get(handlers::me_handler))
        .merge(admin)
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api/auth", auth_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
