use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use super::access::require_site;
use crate::auth::RequireAuth;
use crate::error::Error;
use crate::naming::title_from_slug;
use crate::server::AppState;
use crate::server::dto::{
    CreateToplistRequest, PaginationParams, ReplaceItemsRequest, ToplistResponse,
    UpdateToplistRequest,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::{validate_name, validate_slug};
use crate::toplist::{self, DEFAULT_COLUMNS, ensure_brands_exist, validate_items};
use crate::types::{Toplist, ToplistItem};

pub async fn list_toplists(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;
    let cursor = params.cursor.as_deref().unwrap_or("");

    let toplists = state
        .store
        .list_toplists(&site_key, cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list toplists")?;

    let (toplists, next_cursor, has_more) =
        paginate(toplists, DEFAULT_PAGE_SIZE as usize, |t| t.slug.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(toplists, next_cursor, has_more)))
}

/// Creates a toplist and, optionally, its initial items in one write.
pub async fn create_toplist(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
    Json(req): Json<CreateToplistRequest>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    validate_slug(&req.slug)?;
    let title = match req.title {
        Some(title) => {
            validate_name(&title, "title")?;
            title
        }
        None => title_from_slug(&req.slug),
    };

    validate_items(&req.items)?;
    ensure_brands_exist(state.store.as_ref(), &req.items)?;

    let now = Utc::now();
    let toplist = Toplist {
        id: uuid::Uuid::new_v4().to_string(),
        site_key: site_key.clone(),
        slug: req.slug,
        title,
        columns: req
            .columns
            .unwrap_or_else(|| DEFAULT_COLUMNS.iter().map(|c| (*c).to_string()).collect()),
        column_labels: req.column_labels,
        pages: req.pages,
        created_at: now,
        updated_at: now,
    };

    let items: Vec<ToplistItem> = req
        .items
        .into_iter()
        .zip(0_i64..)
        .map(|(spec, position)| spec.into_item(&toplist.id, position))
        .collect();

    match state.store.create_toplist(&toplist, &items) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("Toplist already exists")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(site_key = %site_key, slug = %toplist.slug, items = items.len(), "Created toplist");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ToplistResponse { toplist, items })),
    ))
}

pub async fn update_toplist(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, slug)): Path<(String, String)>,
    Json(req): Json<UpdateToplistRequest>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let mut toplist = state
        .store
        .get_toplist(&site_key, &slug)
        .api_err("Failed to get toplist")?
        .or_not_found("Toplist not found")?;

    req.slug
        .apply_required(&mut toplist.slug, "slug")
        .map_err(ApiError::bad_request)?;
    validate_slug(&toplist.slug)?;
    req.title
        .apply_required(&mut toplist.title, "title")
        .map_err(ApiError::bad_request)?;
    validate_name(&toplist.title, "title")?;
    req.columns.apply_or_default(&mut toplist.columns);
    req.column_labels.apply_or_default(&mut toplist.column_labels);
    req.pages.apply_or_default(&mut toplist.pages);
    toplist.updated_at = Utc::now();

    match state.store.update_toplist(&toplist) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("Another toplist already uses this slug"));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(ApiResponse::success(toplist)))
}

pub async fn delete_toplist(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, slug)): Path<(String, String)>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let toplist = state
        .store
        .get_toplist(&site_key, &slug)
        .api_err("Failed to get toplist")?
        .or_not_found("Toplist not found")?;

    state
        .store
        .delete_toplist(&toplist.id)
        .api_err("Failed to delete toplist")?;

    tracing::info!(site_key = %site_key, slug = %slug, "Deleted toplist");

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_items(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, slug)): Path<(String, String)>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let toplist = state
        .store
        .get_toplist(&site_key, &slug)
        .api_err("Failed to get toplist")?
        .or_not_found("Toplist not found")?;

    let items = state
        .store
        .list_toplist_items(&toplist.id)
        .api_err("Failed to list toplist items")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(items)))
}

/// Full replacement: the body's array order becomes the display order.
pub async fn replace_items(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, slug)): Path<(String, String)>,
    Json(req): Json<ReplaceItemsRequest>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let items = match toplist::replace_items(state.store.as_ref(), &site_key, &slug, req.items) {
        Ok(items) => items,
        Err(Error::NotFound) => return Err(ApiError::not_found("Toplist not found")),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(ApiResponse::success(items)))
}
