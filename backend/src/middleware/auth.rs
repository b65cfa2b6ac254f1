//! Authentication middleware
//!
//! JWT authentication and role-based access control. A valid bearer token
//! becomes an [`Actor`] in the request extensions; handlers pick it up
//! with [`CurrentUser`] and gate operations with [`require`].

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{Action, Resource, Role};
use shared::types::Actor;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".into()))?;

    let actor = decode_token(token, &state.config.jwt.secret)?;
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Decode and validate a session token into the acting user
pub fn decode_token(token: &str, secret: &str) -> AppResult<Actor> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".into()))?;
    if user_id.is_nil() {
        return Err(AppError::Unauthorized("Invalid user data: user id is required".into()));
    }

    let role: Role = claims
        .role
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("Unknown role in token: {}", claims.role)))?;

    Ok(Actor::new(user_id, role))
}

/// Issue a signed session token for `actor`, valid for `ttl_seconds`
pub fn issue_token(secret: &str, actor: &Actor, ttl_seconds: i64) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: actor.user_id.to_string(),
        role: actor.role.as_str().to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token encoding error: {}", e)))
}

/// Extractor for the authenticated user
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub Actor);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}

/// Permission guard. Denials are logged and never touch state.
pub fn require(actor: &Actor, resource: Resource, action: Action) -> AppResult<()> {
    if actor.can(resource, action) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %actor.user_id,
        role = actor.role.as_str(),
        "Permission denied: requires {}:{}",
        resource,
        action
    );
    Err(AppError::PermissionDenied { resource, action })
}
