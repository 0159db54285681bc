//! Slot layout for the collage canvas
//!
//! The canvas is split into `N` equal-width slots, left to right in input
//! order. Each image is scaled with "contain" semantics (the smaller of the
//! two axis ratios) and centred in its slot horizontally and in the full
//! canvas height vertically.

use super::CollageError;

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 630;
pub const MAX_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Where one source image lands on the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Placement {
    /// Integer draw rectangle `(x, y, width, height)`, at least 1×1.
    pub fn pixel_rect(&self) -> (i64, i64, u32, u32) {
        (
            self.x.round() as i64,
            self.y.round() as i64,
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

pub fn compute_layout(dims: &[(u32, u32)], canvas: CanvasSize) -> Result<Vec<Placement>, CollageError> {
    if dims.is_empty() {
        return Err(CollageError::NoImages);
    }
    if dims.len() > MAX_IMAGES {
        return Err(CollageError::TooManyImages(dims.len()));
    }
    if let Some(index) = dims.iter().position(|&(w, h)| w == 0 || h == 0) {
        return Err(CollageError::DegenerateImage { index });
    }

    let canvas_w = f64::from(canvas.width);
    let canvas_h = f64::from(canvas.height);
    let slot_width = canvas_w / dims.len() as f64;

    Ok(dims
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let (w, h) = (f64::from(w), f64::from(h));
            let scale = (slot_width / w).min(canvas_h / h);
            let draw_w = w * scale;
            let draw_h = h * scale;
            Placement {
                x: i as f64 * slot_width + (slot_width - draw_w) / 2.0,
                y: (canvas_h - draw_h) / 2.0,
                width: draw_w,
                height: draw_h,
                scale,
            }
        })
        .collect())
}
