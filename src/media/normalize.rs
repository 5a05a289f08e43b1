use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::MediaError;

/// Re-encodes logos as PNG, shrinking anything larger than `max_dimension` on either side.
#[derive(Debug, Clone, Copy)]
pub struct LogoNormalizer {
    pub max_dimension: u32,
}

impl LogoNormalizer {
    #[must_use]
    pub const fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
        let img = image::load_from_memory(bytes)?;
        let img = self.fit(img);

        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    fn fit(&self, img: DynamicImage) -> DynamicImage {
        if img.width() <= self.max_dimension && img.height() <= self.max_dimension {
            return img;
        }
        // resize() keeps the aspect ratio within the bounds
        img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
    }
}
