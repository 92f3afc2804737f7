//! Deterministic embedder and image fixtures, shared by unit and
//! integration tests.
#![allow(dead_code)]

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use stylematch_core::{ImageEmbedder, Result};

/// Fixture side length; also the embedder's thumbnail size.
pub const SIDE: u32 = 16;

/// Embeds an image as its mean-centered grayscale thumbnail.
///
/// Horizontal gradients, vertical gradients and checkerboards come out
/// mutually orthogonal, which gives tests predictable similarities.
pub struct PixelEmbedder {
    reported_dimension: usize,
}

impl PixelEmbedder {
    pub fn new() -> Self {
        Self {
            reported_dimension: (SIDE * SIDE) as usize,
        }
    }

    /// Reports one more component than it produces.
    pub fn lying_about_dimension() -> Self {
        Self {
            reported_dimension: (SIDE * SIDE) as usize + 1,
        }
    }
}

impl Default for PixelEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEmbedder for PixelEmbedder {
    fn model_name(&self) -> &str {
        "pixel-thumbnail"
    }

    fn dimension(&self) -> usize {
        self.reported_dimension
    }

    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let gray = image.resize_exact(SIDE, SIDE, FilterType::Nearest).to_luma8();
        let values: Vec<f32> = gray.pixels().map(|p| f32::from(p.0[0])).collect();
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        Ok(values.into_iter().map(|v| v - mean).collect())
    }
}

/// Writes `horizontal * x + vertical * y` as a grayscale PNG.
pub fn write_blend(path: &Path, horizontal: f32, vertical: f32) {
    let image = GrayImage::from_fn(SIDE, SIDE, |x, y| {
        let v = horizontal * x as f32 + vertical * y as f32;
        Luma([v.round().clamp(0.0, 255.0) as u8])
    });
    create_parent(path);
    image
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Writes a left-to-right (or top-to-bottom) gradient.
pub fn write_gradient(path: &Path, vertical: bool) {
    if vertical {
        write_blend(path, 0.0, 16.0);
    } else {
        write_blend(path, 16.0, 0.0);
    }
}

/// Writes a checkerboard with 4-pixel cells.
pub fn write_checkerboard(path: &Path) {
    let image = GrayImage::from_fn(SIDE, SIDE, |x, y| {
        Luma([if (x / 4 + y / 4) % 2 == 0 { 0 } else { 255 }])
    });
    create_parent(path);
    image
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Writes bytes that no decoder accepts.
pub fn write_corrupt(path: &Path) {
    create_parent(path);
    std::fs::write(path, b"this is not an image").unwrap();
}

fn create_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}
