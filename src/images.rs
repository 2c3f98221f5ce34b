use crate::cache::{AssetCache, AssetError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Loads the picture for an item. A successful return means the picture is
/// ready to show.
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<ImageInfo, ImageError>;
}

/// Fetches through the asset cache and fully decodes the picture.
pub struct DecodingImageLoader {
    cache: AssetCache,
}

impl DecodingImageLoader {
    pub fn new(cache: AssetCache) -> Self {
        Self { cache }
    }
}

impl ImageLoader for DecodingImageLoader {
    fn load(&self, url: &str) -> Result<ImageInfo, ImageError> {
        let bytes = self.cache.read(url)?;
        let decoded = image::load_from_memory(&bytes)?;
        let info = ImageInfo {
            width: decoded.width(),
            height: decoded.height(),
        };
        debug!(%url, width = info.width, height = info.height, "Decoded image");
        Ok(info)
    }
}
