use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::{TokenValidationError, extract_token, validate_token};
use crate::error::Result as StoreResult;
use crate::server::AppState;
use crate::store::Store;
use crate::types::{Token, User};

const API_KEY_HEADER: &str = "x-api-key";

/// The caller behind a valid API key.
#[derive(Debug, Clone)]
pub struct Principal {
    pub token: Token,
    pub user: Option<User>,
}

impl Principal {
    /// Admin keys and keys of admin-role users.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.token.is_admin || self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }

    pub fn can_access_site(&self, store: &dyn Store, site_key: &str) -> StoreResult<bool> {
        if self.is_admin() {
            return Ok(true);
        }
        match &self.user {
            Some(user) => store.user_has_site(&user.id, site_key),
            None => Ok(false),
        }
    }
}

/// Extractor that requires any valid API key
pub struct RequireAuth(pub Principal);

/// Extractor that requires an admin key or an admin-role user
pub struct RequireAdmin(pub Principal);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    NotAdmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid API key"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "API key expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"toplist-cms\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_and_validate(parts, state)?;
        Ok(RequireAuth(principal))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_and_validate(parts, state)?;

        if !principal.is_admin() {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(principal))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|h| h.to_str().ok())
}

fn extract_and_validate(parts: &Parts, state: &Arc<AppState>) -> Result<Principal, AuthError> {
    let raw_token = extract_token(
        header(parts, AUTHORIZATION.as_str()),
        header(parts, API_KEY_HEADER),
    )
        .map_err(|e| match e {
            TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
            _ => AuthError::InvalidToken,
        })?
        .ok_or(AuthError::MissingAuth)?;

    let validated =
        validate_token(state.store.as_ref(), &state.tokens, &raw_token).map_err(|e| match e {
            TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
            TokenValidationError::InvalidToken => AuthError::InvalidToken,
            TokenValidationError::TokenExpired => AuthError::TokenExpired,
            TokenValidationError::InternalError => AuthError::InternalError,
        })?;

    Ok(Principal {
        token: validated.token,
        user: validated.user,
    })
}
