// Bearer token extraction and role-based access control

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Role, token::Claims, token::TokenService};

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

/// Caller identity for any authenticated route
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Claims already verified by a guard further out
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self {
                claims: claims.clone(),
            });
        }

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.validate(bearer_token(&parts.headers)?)?;

        Ok(Self { claims })
    }
}

/// Guard that admits only tokens carrying a given role
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Validate the request's token and check its role claims
    pub fn authorize(&self, tokens: &TokenService, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let claims = tokens.validate(bearer_token(headers)?)?;

        if !claims.has_role(self.required_role.as_str()) {
            warn!(
                "Authorization failed: user_id={}, required_role={}, roles={:?}",
                claims.sub, self.required_role, claims.roles
            );
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
            });
        }

        debug!(
            "Authorization successful: user_id={}, role={}",
            claims.sub, self.required_role
        );
        Ok(claims)
    }
}

/// Middleware for admin-only routes.
///
/// Rejects with 401 for a missing or bad token and 403 for a valid token
/// without the Admin role; verified claims are left in request extensions.
pub async fn require_admin(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();
    let claims = RequireRole::admin()
        .authorize(&tokens, request.headers())
        .map_err(|e| {
            warn!("Rejected request to {}: {}", endpoint, e);
            e
        })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
