use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{NewToken, RequireAdmin, issue_token};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateTokenRequest, CreateTokenResponse, CreateUserRequest, PaginationParams,
    UpdateUserRequest, UserResponse,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::{validate_email, validate_name};
use crate::store::Store;
use crate::types::{Patch, User};

/// Dedupes `site_keys` and checks every site exists.
fn checked_site_keys(store: &dyn Store, site_keys: Vec<String>) -> Result<Vec<String>, ApiError> {
    let mut keys: Vec<String> = Vec::with_capacity(site_keys.len());
    for key in site_keys {
        if keys.contains(&key) {
            continue;
        }
        store
            .get_site(&key)
            .api_err("Failed to get site")?
            .ok_or_else(|| ApiError::bad_request(format!("Unknown site '{key}'")))?;
        keys.push(key);
    }
    Ok(keys)
}

fn user_response(store: &dyn Store, user: User) -> Result<UserResponse, ApiError> {
    let site_keys = store
        .list_user_sites(&user.id)
        .api_err("Failed to list user sites")?;
    Ok(UserResponse { user, site_keys })
}

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    if let Some(name) = &req.name {
        validate_name(name, "name")?;
    }

    let site_keys = checked_site_keys(state.store.as_ref(), req.site_keys)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        name: req.name,
        role: req.role,
        created_at: now,
        updated_at: now,
    };

    match state.store.create_user(&user, &site_keys) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("A user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, role = %user.role, "Created user");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResponse { user, site_keys })),
    ))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let users = state
        .store
        .list_users(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list users")?;

    let (users, next_cursor, has_more) =
        paginate(users, DEFAULT_PAGE_SIZE as usize, |u| u.id.clone());

    let responses = users
        .into_iter()
        .map(|u| user_response(state.store.as_ref(), u))
        .collect::<Result<Vec<_>, _>>()?;

    Ok::<_, ApiError>(Json(PaginatedResponse::new(responses, next_cursor, has_more)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let response = user_response(state.store.as_ref(), user)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn update_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let mut user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    req.email
        .map(|e| e.trim().to_lowercase())
        .apply_required(&mut user.email, "email")
        .map_err(ApiError::bad_request)?;
    validate_email(&user.email)?;
    req.name.apply(&mut user.name);
    if let Some(name) = &user.name {
        validate_name(name, "name")?;
    }
    req.role
        .apply_required(&mut user.role, "role")
        .map_err(ApiError::bad_request)?;
    user.updated_at = Utc::now();

    let site_keys = match req.site_keys {
        Patch::Absent => None,
        Patch::Null => Some(Vec::new()),
        Patch::Value(keys) => Some(checked_site_keys(state.store.as_ref(), keys)?),
    };

    match state.store.update_user(&user, site_keys.as_deref()) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("A user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    let response = user_response(state.store.as_ref(), user)?;

    Ok(Json(ApiResponse::success(response)))
}

pub async fn delete_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_user(&id)
        .api_err("Failed to delete user")?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_user_tokens(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let tokens = state
        .store
        .list_user_tokens(&id)
        .api_err("Failed to list tokens")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tokens)))
}

/// Mints a key for the user. The raw key appears in this response only.
pub async fn create_user_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateTokenRequest>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let expires_at = match req.expires_in_seconds {
        Some(secs) if secs <= 0 => {
            return Err(ApiError::bad_request("expiresInSeconds must be positive"));
        }
        Some(secs) => Some(
            Duration::try_seconds(secs)
                .and_then(|d| Utc::now().checked_add_signed(d))
                .ok_or_else(|| ApiError::bad_request("expiresInSeconds is out of range"))?,
        ),
        None => None,
    };

    let (token, metadata) = issue_token(
        state.store.as_ref(),
        &state.tokens,
        NewToken {
            is_admin: false,
            user_id: Some(user.id),
            description: req.description,
            expires_at,
        },
    )
    .api_err("Failed to create token")?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateTokenResponse { token, metadata })),
    ))
}
