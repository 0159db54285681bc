// Raster composition and JPEG encoding

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use super::layout::{compute_layout, CanvasSize};
use super::CollageError;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Draw `images` onto a white canvas, one per slot, in input order.
pub fn compose(images: &[DynamicImage], canvas: CanvasSize) -> Result<RgbImage, CollageError> {
    let dims: Vec<(u32, u32)> = images.iter().map(|img| img.dimensions()).collect();
    let layout = compute_layout(&dims, canvas)?;

    let mut out = RgbImage::from_pixel(canvas.width, canvas.height, BACKGROUND);
    for (image, placement) in images.iter().zip(&layout) {
        let (x, y, w, h) = placement.pixel_rect();
        let resized = image.resize_exact(w, h, FilterType::Triangle).to_rgb8();
        imageops::overlay(&mut out, &resized, x, y);
    }

    Ok(out)
}

pub fn encode_jpeg(canvas: &RgbImage, quality: u8) -> Result<Vec<u8>, CollageError> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(canvas)
        .map_err(|e| CollageError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
