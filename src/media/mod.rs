//! Brand logo handling: remote fetch, normalization and local object storage.

mod normalize;
mod pipeline;
mod storage;

use std::io::ErrorKind;

use thiserror::Error;

pub use normalize::LogoNormalizer;
pub use pipeline::{HttpLogoPipeline, LogoPipeline, StoredLogo};
pub use storage::{MediaStorage, StoredObject, is_valid_key, object_key};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("object not found")]
    NotFound,
    #[error("invalid object key")]
    InvalidKey,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fetch returned HTTP {0}")]
    Status(u16),
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),
    #[error("logo exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MediaError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}
