use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::manage::manage_router;
use super::public::{get_public_toplist, serve_media};
use crate::auth::TokenGenerator;
use crate::config::ServerConfig;
use crate::media::{HttpLogoPipeline, LogoNormalizer, MediaError, MediaStorage};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<MediaStorage>,
    pub logos: HttpLogoPipeline,
    pub tokens: TokenGenerator,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Result<Self, MediaError> {
        let media = Arc::new(MediaStorage::new(&config.data_dir));
        let logos = HttpLogoPipeline::new(
            media.clone(),
            LogoNormalizer::new(config.logo_max_dimension),
            config.logo_max_bytes,
            config.fetch_timeout(),
            config.base_url(),
        )?;

        Ok(Self {
            store,
            media,
            logos,
            tokens: TokenGenerator::new(),
            cors_origins: config.cors_origins.clone(),
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

const CORS_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const CORS_HEADERS: &str = "Authorization, Content-Type, X-API-Key";

fn allowed_origin(origins: &[String], origin: &HeaderValue) -> Option<HeaderValue> {
    if origins.is_empty() {
        return Some(HeaderValue::from_static("*"));
    }
    let origin_str = origin.to_str().ok()?;
    origins
        .iter()
        .any(|o| o == origin_str)
        .then(|| origin.clone())
}

/// Answers preflight requests and stamps allow-origin headers on cross-origin responses.
async fn cors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let allow = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|origin| allowed_origin(&state.cors_origins, origin));

    let preflight = request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let mut response = if preflight {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let Some(origin) = allow {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        if preflight {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(CORS_METHODS),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(CORS_HEADERS),
            );
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
        }
    }

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/media/{*key}", get(serve_media))
        .route(
            "/api/sites/{site_key}/toplists/{slug}",
            get(get_public_toplist)
                .patch(super::manage::toplists::update_toplist)
                .delete(super::manage::toplists::delete_toplist),
        )
        .nest("/api/admin", admin_router())
        .nest("/api", manage_router())
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::store::SqliteStore;

    fn test_router(cors_origins: Vec<String>) -> (TempDir, Router) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();

        let config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            cors_origins,
            ..ServerConfig::default()
        };
        let state = Arc::new(AppState::new(Arc::new(store), &config).unwrap());
        (temp_dir, create_router(state))
    }

    #[tokio::test]
    async fn test_preflight_for_listed_origin() {
        let (_dir, app) = test_router(vec!["https://cazinou.io".to_string()]);

        let request = http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/sites/cazinou-io/toplists/home")
            .header(header::ORIGIN, "https://cazinou.io")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://cazinou.io"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], CORS_METHODS);
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_cors_headers() {
        let (_dir, app) = test_router(vec!["https://cazinou.io".to_string()]);

        let request = http::Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_media_rejects_bad_keys() {
        let (_dir, app) = test_router(Vec::new());

        let request = http::Request::builder()
            .uri("/media/logos/not-a-hash.png")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_allowed_origin() {
        let origin = HeaderValue::from_static("https://cazinou.io");

        assert_eq!(allowed_origin(&[], &origin).unwrap(), "*");

        let list = vec!["https://cazinou.io".to_string()];
        assert_eq!(allowed_origin(&list, &origin).unwrap(), "https://cazinou.io");

        let other = HeaderValue::from_static("https://evil.example");
        assert!(allowed_origin(&list, &other).is_none());
    }
}
