// HTTP handlers for authentication and user administration endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{
    middleware::AuthenticatedUser,
    models::{primary_role, AuthResponse, CreateUserRequest, LoginRequest, MeResponse, UserResponse},
    service::AuthService,
};
use crate::error::{ApiError, ApiResponse};

const USER_NOT_FOUND: &str = "User not found";

/// Log in with email and password
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let response = service
        .login(&request.email, &request.password)
        .await
        .map_err(|e| e.into_api_error(StatusCode::UNAUTHORIZED))?;

    Ok(ApiResponse::with_message("Login successful", response))
}

/// Identity of the caller, taken from the token's own claims
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(user: AuthenticatedUser) -> ApiResponse<MeResponse> {
    let claims = user.claims;
    ApiResponse::data(MeResponse {
        role: primary_role(&claims.roles),
        user_id: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}

/// Create an HR or Interviewer account (Admin only)
/// POST /api/auth/create-user
#[utoipa::path(
    post,
    path = "/api/auth/create-user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid role, duplicate email or rejected password", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an Admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user = service
        .create_user(request)
        .await
        .map_err(|e| e.into_api_error(StatusCode::BAD_REQUEST))?;

    Ok(ApiResponse::with_message("User created successfully", user))
}

/// List active users (Admin only)
/// GET /api/auth/users
#[utoipa::path(
    get,
    path = "/api/auth/users",
    responses(
        (status = 200, description = "Active users", body = Vec<UserResponse>),
        (status = 400, description = "Store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_all_users_handler(
    State(service): State<Arc<AuthService>>,
) -> Result<ApiResponse<Vec<UserResponse>>, ApiError> {
    let users = service
        .get_all_users()
        .await
        .map_err(|e| e.into_api_error(StatusCode::BAD_REQUEST))?;

    tracing::debug!("Retrieved {} active users", users.len());
    Ok(ApiResponse::data(users))
}

/// Fetch one user by id, active or not (Admin only)
/// GET /api/auth/users/:id
#[utoipa::path(
    get,
    path = "/api/auth/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_by_id_handler(
    State(service): State<Arc<AuthService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    service
        .get_user_by_id(&id)
        .await
        .map_err(|e| e.into_api_error(StatusCode::BAD_REQUEST))?
        .map(ApiResponse::data)
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

/// Deactivate a user (Admin only)
/// DELETE /api/auth/users/:id
#[utoipa::path(
    delete,
    path = "/api/auth/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deactivated successfully", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn deactivate_user_handler(
    State(service): State<Arc<AuthService>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let deactivated = service
        .deactivate_user(&id)
        .await
        .map_err(|e| e.into_api_error(StatusCode::BAD_REQUEST))?;

    if !deactivated {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    Ok(ApiResponse::message("User deactivated successfully"))
}
