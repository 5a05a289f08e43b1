use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::auth::{RequireAdmin, RequireAuth};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreateBrandRequest, PaginationParams, UpdateBrandRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::{validate_brand, validate_brand_id};
use crate::types::Brand;

impl CreateBrandRequest {
    fn into_brand(self) -> Brand {
        let mut brand = Brand::new(self.brand_id, self.name);
        brand.default_logo = self.default_logo;
        brand.default_affiliate_url = self.default_affiliate_url;
        brand.default_bonus = self.default_bonus;
        brand.default_rating = self.default_rating.map(f64::from);
        brand.terms = self.terms;
        brand.license = self.license;
        brand.pros = self.pros;
        brand.cons = self.cons;
        brand.description = self.description;
        brand.website_url = self.website_url;
        brand.founded_year = self.founded_year;
        brand.owner = self.owner;
        brand.min_deposit = self.min_deposit;
        brand.withdrawal_time = self.withdrawal_time;
        brand.accepted_countries = self.accepted_countries;
        brand.restricted_countries = self.restricted_countries;
        brand.payment_methods = self.payment_methods;
        brand.currencies = self.currencies;
        brand.game_types = self.game_types;
        brand.game_providers = self.game_providers;
        brand.languages = self.languages;
        brand.support_email = self.support_email;
        brand.support_channels = self.support_channels;
        brand.has_mobile_app = self.has_mobile_app;
        brand.has_live_chat = self.has_live_chat;
        brand
    }
}

impl UpdateBrandRequest {
    fn apply(self, brand: &mut Brand) -> Result<(), ApiError> {
        self.name
            .apply_required(&mut brand.name, "name")
            .map_err(ApiError::bad_request)?;
        self.default_logo.apply(&mut brand.default_logo);
        self.default_affiliate_url.apply(&mut brand.default_affiliate_url);
        self.default_bonus.apply(&mut brand.default_bonus);
        self.default_rating
            .map(f64::from)
            .apply(&mut brand.default_rating);
        self.terms.apply(&mut brand.terms);
        self.license.apply(&mut brand.license);
        self.pros.apply_or_default(&mut brand.pros);
        self.cons.apply_or_default(&mut brand.cons);
        self.description.apply(&mut brand.description);
        self.website_url.apply(&mut brand.website_url);
        self.founded_year.apply(&mut brand.founded_year);
        self.owner.apply(&mut brand.owner);
        self.min_deposit.apply(&mut brand.min_deposit);
        self.withdrawal_time.apply(&mut brand.withdrawal_time);
        self.accepted_countries
            .apply_or_default(&mut brand.accepted_countries);
        self.restricted_countries
            .apply_or_default(&mut brand.restricted_countries);
        self.payment_methods.apply_or_default(&mut brand.payment_methods);
        self.currencies.apply_or_default(&mut brand.currencies);
        self.game_types.apply_or_default(&mut brand.game_types);
        self.game_providers.apply_or_default(&mut brand.game_providers);
        self.languages.apply_or_default(&mut brand.languages);
        self.support_email.apply(&mut brand.support_email);
        self.support_channels
            .apply_or_default(&mut brand.support_channels);
        self.has_mobile_app.apply_or_default(&mut brand.has_mobile_app);
        self.has_live_chat.apply_or_default(&mut brand.has_live_chat);
        Ok(())
    }
}

pub async fn list_brands(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let brands = state
        .store
        .list_brands(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list brands")?;

    let (brands, next_cursor, has_more) =
        paginate(brands, DEFAULT_PAGE_SIZE as usize, |b| b.brand_id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(brands, next_cursor, has_more)))
}

pub async fn create_brand(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBrandRequest>,
) -> impl IntoResponse {
    validate_brand_id(&req.brand_id)?;

    let brand = req.into_brand();
    validate_brand(&brand)?;

    match state.store.create_brand(&brand) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("Brand already exists")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(brand_id = %brand.brand_id, "Created brand");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(brand))))
}

pub async fn get_brand(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(brand_id): Path<String>,
) -> impl IntoResponse {
    let brand = state
        .store
        .get_brand(&brand_id)
        .api_err("Failed to get brand")?
        .or_not_found("Brand not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(brand)))
}

pub async fn update_brand(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(brand_id): Path<String>,
    Json(req): Json<UpdateBrandRequest>,
) -> impl IntoResponse {
    let mut brand = state
        .store
        .get_brand(&brand_id)
        .api_err("Failed to get brand")?
        .or_not_found("Brand not found")?;

    if req.brand_id.as_deref().is_some_and(|id| id != brand.brand_id) {
        return Err(ApiError::bad_request("brandId cannot be changed"));
    }

    req.apply(&mut brand)?;
    validate_brand(&brand)?;
    brand.updated_at = Utc::now();

    state.store.update_brand(&brand)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(brand)))
}

pub async fn delete_brand(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(brand_id): Path<String>,
) -> impl IntoResponse {
    state
        .store
        .get_brand(&brand_id)
        .api_err("Failed to get brand")?
        .or_not_found("Brand not found")?;

    let usage = state
        .store
        .brand_usage(&brand_id)
        .api_err("Failed to count brand usage")?;

    if usage.total() > 0 {
        return Err(ApiError::conflict("Brand is still in use").with_details(json!({ "usage": usage })));
    }

    let deleted = state.store.delete_brand(&brand_id)?;
    if !deleted {
        return Err(ApiError::not_found("Brand not found"));
    }

    tracing::info!(brand_id = %brand_id, "Deleted brand");

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn brand_usage(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(brand_id): Path<String>,
) -> impl IntoResponse {
    state
        .store
        .get_brand(&brand_id)
        .api_err("Failed to get brand")?
        .or_not_found("Brand not found")?;

    let usage = state
        .store
        .brand_usage(&brand_id)
        .api_err("Failed to count brand usage")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(usage)))
}
