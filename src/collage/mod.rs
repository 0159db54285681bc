//! Product photo collage
//!
//! Builds the 1200×630 Open Graph image for a product from up to three photo
//! URLs:
//!
//! 1. select the first three non-blank URLs
//! 2. download all of them concurrently under a single timeout
//! 3. decode, reject zero-sized images
//! 4. lay out one equal-width slot per image ([`layout`]) and draw onto a
//!    white canvas ([`compose`])
//! 5. encode as JPEG
//!
//! It is all or nothing: any failure in steps 2–5 fails the collage and the
//! caller falls back to a redirect.

pub mod compose;
pub mod fetch;
pub mod layout;

pub use compose::{compose, encode_jpeg};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use layout::{compute_layout, CanvasSize, Placement, CANVAS_HEIGHT, CANVAS_WIDTH, MAX_IMAGES};

use futures::future::try_join_all;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::config::CollageConfig;

#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    #[error("no images to compose")]
    NoImages,

    #[error("{0} images given, at most {max} fit on the canvas", max = MAX_IMAGES)]
    TooManyImages(usize),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetching source images timed out")]
    Timeout,

    #[error("image {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },

    #[error("image {index} has zero width or height")]
    DegenerateImage { index: usize },

    #[error("failed to encode collage: {0}")]
    Encode(String),
}

/// First [`MAX_IMAGES`] non-blank URLs, in order.
pub fn select_urls(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .take(MAX_IMAGES)
        .map(str::to_string)
        .collect()
}

fn decode(index: usize, bytes: &[u8]) -> Result<DynamicImage, CollageError> {
    let image = image::load_from_memory(bytes).map_err(|e| CollageError::Decode {
        index,
        reason: e.to_string(),
    })?;
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(CollageError::DegenerateImage { index });
    }
    Ok(image)
}

/// Fetch, compose and encode a collage for `urls` (already selected).
pub async fn build_collage(
    fetcher: &dyn ImageFetcher,
    urls: &[String],
    config: &CollageConfig,
) -> Result<Vec<u8>, CollageError> {
    if urls.is_empty() {
        return Err(CollageError::NoImages);
    }
    if urls.len() > MAX_IMAGES {
        return Err(CollageError::TooManyImages(urls.len()));
    }

    let downloads = urls.iter().map(|url| async move {
        fetcher.fetch(url).await.map_err(|reason| {
            warn!(url = %url, reason = %reason, "Collage source fetch failed");
            CollageError::Fetch {
                url: url.clone(),
                reason,
            }
        })
    });

    let bodies = tokio::time::timeout(config.fetch_timeout(), try_join_all(downloads))
        .await
        .map_err(|_| CollageError::Timeout)??;
    debug!(count = bodies.len(), "Collage sources downloaded");

    let quality = config.jpeg_quality;
    tokio::task::spawn_blocking(move || {
        let images = bodies
            .iter()
            .enumerate()
            .map(|(i, bytes)| decode(i, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let canvas = compose(&images, CanvasSize::default())?;
        encode_jpeg(&canvas, quality)
    })
    .await
    .map_err(|e| CollageError::Encode(e.to_string()))?
}
