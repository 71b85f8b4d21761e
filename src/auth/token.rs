// JWT token generation and validation service

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::config::JwtSettings;

/// Every token is valid for exactly this long; there is no refresh.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Username (the login email)
    pub name: String,
    pub email: String,
    /// One entry per role membership
    #[serde(rename = "role", default)]
    pub roles: Vec<String>,
    /// Per-token nonce
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// What the signer needs to know about a user
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub roles: &'a [String],
}

/// A freshly signed token with its validity window
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a TokenService from validated settings
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Sign a token for the subject, valid for 24 hours from now
    pub fn issue(&self, subject: &TokenSubject<'_>) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(
        &self,
        subject: &TokenSubject<'_>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        // Whole seconds so the claim and the reported expiration agree exactly
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at + self.lifetime;

        let claims = Claims {
            sub: subject.user_id.to_string(),
            name: subject.username.to_string(),
            email: subject.email.to_string(),
            roles: subject.roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;
        debug!(user_id = %subject.user_id, roles = ?subject.roles, "jwt signed");

        Ok(IssuedToken {
            token,
            expires_at,
        })
    }

    /// Check signature, issuer, audience and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}
