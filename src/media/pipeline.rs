use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use super::{LogoNormalizer, MediaError, MediaStorage};

/// A logo persisted in media storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLogo {
    pub key: String,
    pub url: String,
    /// False when identical bytes were already stored, so the object may be shared.
    pub fresh: bool,
}

/// Turns a remote logo URL into a stored object, and undoes that on request.
pub trait LogoPipeline: Send + Sync {
    fn ingest(&self, url: &str) -> impl Future<Output = Result<StoredLogo, MediaError>> + Send;

    fn discard(&self, logo: &StoredLogo) -> impl Future<Output = Result<(), MediaError>> + Send;
}

pub struct HttpLogoPipeline {
    http: reqwest::Client,
    storage: Arc<MediaStorage>,
    normalizer: LogoNormalizer,
    max_bytes: usize,
    public_base_url: String,
}

impl HttpLogoPipeline {
    pub fn new(
        storage: Arc<MediaStorage>,
        normalizer: LogoNormalizer,
        max_bytes: usize,
        timeout: Duration,
        public_base_url: impl Into<String>,
    ) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            storage,
            normalizer,
            max_bytes,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, MediaError> {
        let mut resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::Status(status.as_u16()));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(MediaError::UnsupportedContentType(content_type));
        }

        let declared = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > self.max_bytes) {
            return Err(MediaError::TooLarge {
                limit: self.max_bytes,
            });
        }

        // Content-Length is optional; the limit is checked as chunks arrive.
        let mut body = BytesMut::with_capacity(declared.unwrap_or(0));
        while let Some(chunk) = resp.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(MediaError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }

    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/media/{key}", self.public_base_url)
    }
}

impl LogoPipeline for HttpLogoPipeline {
    async fn ingest(&self, url: &str) -> Result<StoredLogo, MediaError> {
        let raw = self.fetch(url).await?;

        let normalizer = self.normalizer;
        let png = tokio::task::spawn_blocking(move || normalizer.normalize(&raw))
            .await
            .map_err(|e| MediaError::Io(std::io::Error::other(e)))??;

        let stored = self.storage.put("logos", &png, "png").await?;
        tracing::debug!(source = url, key = %stored.key, fresh = stored.created, "Stored logo");

        Ok(StoredLogo {
            url: self.public_url(&stored.key),
            key: stored.key,
            fresh: stored.created,
        })
    }

    async fn discard(&self, logo: &StoredLogo) -> Result<(), MediaError> {
        if logo.fresh {
            self.storage.delete(&logo.key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::Router;
    use axum::body::Body;
    use axum::http::header;
    use axum::routing::get;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(300, 150, Rgba([0, 120, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    async fn spawn_origin() -> String {
        let logo = png_bytes();
        let streamed = logo.clone();
        let app = Router::new()
            .route(
                "/logo.png",
                get(move || {
                    let logo = logo.clone();
                    async move { ([(header::CONTENT_TYPE, "image/png")], logo) }
                }),
            )
            .route(
                "/streamed.png",
                get(move || {
                    let body = Body::from_stream(tokio_util::io::ReaderStream::new(Cursor::new(
                        streamed.clone(),
                    )));
                    async move { ([(header::CONTENT_TYPE, "image/png")], body) }
                }),
            )
            .route(
                "/page",
                get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn pipeline(temp: &TempDir, max_bytes: usize) -> HttpLogoPipeline {
        HttpLogoPipeline::new(
            Arc::new(MediaStorage::new(temp.path())),
            LogoNormalizer::new(100),
            max_bytes,
            Duration::from_secs(5),
            "https://cms.example.com/",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_stores_normalized_png() {
        let origin = spawn_origin().await;
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp, 1024 * 1024);

        let logo = pipeline
            .ingest(&format!("{origin}/logo.png"))
            .await
            .unwrap();
        assert!(logo.key.starts_with("logos/"));
        assert_eq!(logo.url, format!("https://cms.example.com/media/{}", logo.key));
        assert!(logo.fresh);
        assert!(pipeline.storage.exists(&logo.key).await.unwrap());

        let again = pipeline
            .ingest(&format!("{origin}/logo.png"))
            .await
            .unwrap();
        assert_eq!(again.key, logo.key);
        assert!(!again.fresh);
        pipeline.discard(&again).await.unwrap();
        assert!(pipeline.storage.exists(&logo.key).await.unwrap());

        pipeline.discard(&logo).await.unwrap();
        assert!(!pipeline.storage.exists(&logo.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_non_image_content() {
        let origin = spawn_origin().await;
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp, 1024 * 1024);

        let err = pipeline.ingest(&format!("{origin}/page")).await.unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedContentType(ct) if ct == "text/html"));
    }

    #[tokio::test]
    async fn test_rejects_missing_and_oversized() {
        let origin = spawn_origin().await;
        let temp = TempDir::new().unwrap();

        let err = pipeline(&temp, 1024 * 1024)
            .ingest(&format!("{origin}/missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Status(404)));

        let err = pipeline(&temp, 10)
            .ingest(&format!("{origin}/logo.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { limit: 10 }));
    }

    #[tokio::test]
    async fn test_limit_applies_without_content_length() {
        let origin = spawn_origin().await;
        let temp = TempDir::new().unwrap();

        let err = pipeline(&temp, 10)
            .ingest(&format!("{origin}/streamed.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { limit: 10 }));

        let logo = pipeline(&temp, 1024 * 1024)
            .ingest(&format!("{origin}/streamed.png"))
            .await
            .unwrap();
        assert!(logo.fresh);
    }
}
