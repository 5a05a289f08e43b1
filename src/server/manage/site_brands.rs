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
use crate::server::AppState;
use crate::server::dto::{PaginationParams, SiteBrandRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::toplist::list_site_deals;
use crate::types::SiteBrand;

impl SiteBrandRequest {
    fn apply(self, deal: &mut SiteBrand) {
        self.logo.apply(&mut deal.logo);
        self.bonus.apply(&mut deal.bonus);
        self.affiliate_url.apply(&mut deal.affiliate_url);
        self.rating.map(f64::from).apply(&mut deal.rating);
        self.terms.apply(&mut deal.terms);
        self.pros.apply(&mut deal.pros);
        self.cons.apply(&mut deal.cons);
        self.welcome_package.apply(&mut deal.welcome_package);
        if let Some(is_active) = self.is_active {
            deal.is_active = is_active;
        }
    }
}

/// Every brand as this site would render it, with site terms merged over defaults.
pub async fn list_deals(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;
    let cursor = params.cursor.as_deref().unwrap_or("");

    let deals = list_site_deals(state.store.as_ref(), &site_key, cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list site deals")?;

    let (deals, next_cursor, has_more) =
        paginate(deals, DEFAULT_PAGE_SIZE as usize, |d| d.brand_id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(deals, next_cursor, has_more)))
}

pub async fn get_deal(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, brand_id)): Path<(String, String)>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let deal = state
        .store
        .get_site_brand(&site_key, &brand_id)
        .api_err("Failed to get site deal")?
        .or_not_found("Site deal not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(deal)))
}

/// Creates or patches the site's terms for a brand.
pub async fn upsert_deal(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, brand_id)): Path<(String, String)>,
    Json(req): Json<SiteBrandRequest>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    state
        .store
        .get_brand(&brand_id)
        .api_err("Failed to get brand")?
        .or_not_found("Brand not found")?;

    let existing = state
        .store
        .get_site_brand(&site_key, &brand_id)
        .api_err("Failed to get site deal")?;
    let created = existing.is_none();

    let mut deal = existing.unwrap_or_else(|| SiteBrand::new(&site_key, &brand_id));
    req.apply(&mut deal);
    deal.updated_at = Utc::now();

    state.store.upsert_site_brand(&deal)?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok::<_, ApiError>((status, Json(ApiResponse::success(deal))))
}

pub async fn delete_deal(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((site_key, brand_id)): Path<(String, String)>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;

    let deleted = state
        .store
        .delete_site_brand(&site_key, &brand_id)
        .api_err("Failed to delete site deal")?;

    if !deleted {
        return Err(ApiError::not_found("Site deal not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
