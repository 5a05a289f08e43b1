use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::access::require_site;
use crate::auth::{RequireAdmin, RequireAuth};
use crate::import::{BrandImport, ToplistImport, import_brands, import_toplists};
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

/// A document whose top level has the wrong shape is rejected before any write.
fn decode_document<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Malformed import document: {e}")))
}

pub async fn import_brands_handler(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let doc: BrandImport = decode_document(body)?;

    let report = import_brands(state.store.as_ref(), &state.logos, doc).await;

    Ok::<_, ApiError>(Json(ApiResponse::success(report)))
}

pub async fn import_toplists_handler(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(site_key): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    require_site(&state, &principal, &site_key)?;
    let doc: ToplistImport = decode_document(body)?;

    let report = import_toplists(state.store.as_ref(), &site_key, doc)
        .api_err("Failed to import toplists")?;

    tracing::info!(
        site_key = %site_key,
        imported = report.imported,
        skipped = report.skipped,
        warnings = report.warnings.len(),
        "Toplist import finished"
    );

    Ok::<_, ApiError>(Json(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_document_rejects_wrong_top_level() {
        let err = decode_document::<BrandImport>(json!({ "brands": [1, 2] })).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        let doc = decode_document::<BrandImport>(json!({ "brands": { "Betano": {} } })).unwrap();
        assert_eq!(doc.brands.len(), 1);
    }
}
