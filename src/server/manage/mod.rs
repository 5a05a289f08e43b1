mod access;
mod brands;
mod imports;
mod site_brands;
mod sites;
pub mod toplists;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::response::ApiResponse;
use crate::types::registry;

async fn list_registries(_auth: RequireAuth) -> impl IntoResponse {
    Json(ApiResponse::success(registry::all()))
}

/// Authenticated CMS routes, mounted under `/api`.
///
/// `PATCH|DELETE /sites/{site_key}/toplists/{slug}` shares its path with the
/// public document and is registered by the top-level router. A toplist slugged
/// `import` is shadowed by the import route.
pub fn manage_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/registries", get(list_registries))
        // Brand routes
        .route("/brands", get(brands::list_brands).post(brands::create_brand))
        .route("/brands/import", post(imports::import_brands_handler))
        .route(
            "/brands/{brand_id}",
            get(brands::get_brand)
                .put(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route("/brands/{brand_id}/usage", get(brands::brand_usage))
        // Site routes
        .route("/sites", get(sites::list_sites).post(sites::create_site))
        .route(
            "/sites/{site_key}",
            get(sites::get_site)
                .put(sites::update_site)
                .delete(sites::delete_site),
        )
        // Site deal routes
        .route("/sites/{site_key}/brands", get(site_brands::list_deals))
        .route(
            "/sites/{site_key}/brands/{brand_id}",
            get(site_brands::get_deal)
                .put(site_brands::upsert_deal)
                .delete(site_brands::delete_deal),
        )
        // Toplist routes
        .route(
            "/sites/{site_key}/toplists",
            get(toplists::list_toplists).post(toplists::create_toplist),
        )
        .route(
            "/sites/{site_key}/toplists/import",
            post(imports::import_toplists_handler),
        )
        .route(
            "/sites/{site_key}/toplists/{slug}/items",
            get(toplists::list_items).put(toplists::replace_items),
        )
}
