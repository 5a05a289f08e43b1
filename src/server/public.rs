use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio_util::io::ReaderStream;

use crate::media::MediaError;
use crate::server::AppState;
use crate::toplist::build_public_toplist;

/// Unauthenticated toplist document. Not wrapped in the `{data, error}` envelope.
pub async fn get_public_toplist(
    State(state): State<Arc<AppState>>,
    Path((site_key, slug)): Path<(String, String)>,
) -> Response {
    match build_public_toplist(state.store.as_ref(), &site_key, &slug) {
        Ok(Some(doc)) => Json(doc).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Toplist not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(site_key = %site_key, slug = %slug, "Failed to build toplist: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    let (reader, size) = match state.media.get(&key).await {
        Ok(found) => found,
        Err(MediaError::NotFound | MediaError::InvalidKey) => {
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            tracing::error!(key = %key, "Failed to open media object: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = Body::from_stream(ReaderStream::new(reader)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&key)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    // Keys are content hashes, so an object never changes.
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("logos/abc.png"), "image/png");
        assert_eq!(content_type_for("logos/abc.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("logos/abc"), "application/octet-stream");
    }
}
