use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use super::access::require_site;
use crate::auth::{RequireAdmin, RequireAuth};
use crate::error::Error;
use crate::naming::domain_to_site_key;
use crate::server::AppState;
use crate::server::dto::{CreateSiteRequest, PaginationParams, UpdateSiteRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreResultExt, paginate,
};
use crate::server::validation::{validate_domain, validate_name};
use crate::types::Site;

/// Admins page through every site; editors get their assigned sites in one page.
pub async fn list_sites(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    if principal.is_admin() {
        let cursor = params.cursor.as_deref().unwrap_or("");
        let sites = state
            .store
            .list_sites(cursor, DEFAULT_PAGE_SIZE + 1)
            .api_err("Failed to list sites")?;

        let (sites, next_cursor, has_more) =
            paginate(sites, DEFAULT_PAGE_SIZE as usize, |s| s.site_key.clone());

        return Ok::<_, ApiError>(Json(PaginatedResponse::new(sites, next_cursor, has_more)));
    }

    let mut sites = Vec::new();
    if let Some(user) = &principal.user {
        let keys = state
            .store
            .list_user_sites(&user.id)
            .api_err("Failed to list user sites")?;
        for key in keys {
            if let Some(site) = state.store.get_site(&key).api_err("Failed to get site")? {
                sites.push(site);
            }
        }
    }

    Ok(Json(PaginatedResponse::new(sites, None, false)))
}

pub async fn create_site(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSiteRequest>,
) -> impl IntoResponse {
    let domain = req.domain.trim().to_lowercase();
    validate_domain(&domain)?;

    let name = match req.name {
        Some(name) => {
            validate_name(&name, "name")?;
            name
        }
        None => domain.clone(),
    };

    let now = Utc::now();
    let site = Site {
        site_key: domain_to_site_key(&domain),
        domain,
        name,
        serps: req.serps,
        created_at: now,
        updated_at: now,
    };

    match state.store.create_site(&site) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("Site already exists")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(site_key = %site.site_key, "Created site");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(site))))
}

pub async fn get_site(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
) -> impl IntoResponse {
    let site = require_site(&state, &principal, &site_key)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(site)))
}

pub async fn update_site(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
    Json(req): Json<UpdateSiteRequest>,
) -> impl IntoResponse {
    let mut site = require_site(&state, &principal, &site_key)?;

    req.name
        .apply_required(&mut site.name, "name")
        .map_err(ApiError::bad_request)?;
    validate_name(&site.name, "name")?;
    req.serps.apply_or_default(&mut site.serps);
    site.updated_at = Utc::now();

    state.store.update_site(&site)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(site)))
}

/// Deletes the site with its deals, toplists and items.
pub async fn delete_site(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_site(&site_key)
        .api_err("Failed to delete site")?;

    if !deleted {
        return Err(ApiError::not_found("Site not found"));
    }

    tracing::info!(site_key = %site_key, "Deleted site");

    Ok(StatusCode::NO_CONTENT)
}
