use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::store::Store;
use crate::types::{Token, User};

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    InternalError,
}

pub struct ValidatedToken {
    pub token: Token,
    pub user: Option<User>,
}

/// Picks the API key from `Authorization: Bearer <key>` or, failing that, `X-API-Key`.
/// Returns `Ok(None)` when neither header is present.
pub fn extract_token(
    authorization: Option<&str>,
    api_key: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match authorization {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => Ok(Some(token.trim().to_string())),
            None => Err(TokenValidationError::InvalidScheme),
        },
        None => Ok(api_key.map(|k| k.trim().to_string())),
    }
}

/// Validates a raw key against the store.
/// Returns the token and its user, if the key belongs to one.
pub fn validate_token(
    store: &dyn Store,
    generator: &TokenGenerator,
    raw_token: &str,
) -> Result<ValidatedToken, TokenValidationError> {
    let parts = parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = store
        .get_token_by_lookup(parts.lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let user = match &token.user_id {
        Some(user_id) => Some(
            store
                .get_user(user_id)
                .map_err(|_| TokenValidationError::InternalError)?
                .ok_or(TokenValidationError::InvalidToken)?,
        ),
        None => None,
    };

    if let Err(e) = store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(ValidatedToken { token, user })
}
