use crate::Effect;
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgba, RgbaImage};
use photon_rs::{PhotonImage, conv};
use rayon::prelude::*;

// photon's edge kernel output is doubled at the default intensity of 0.5
const EDGE_GAIN: f32 = 2.0;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EdgeDetectionConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f32,
}

impl EdgeDetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for EdgeDetectionConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let (width, height) = (image.width(), image.height());
        let mut photon_img = PhotonImage::new(image.to_vec(), width, height);
        conv::edge_detection(&mut photon_img);

        let mut result = RgbaImage::from_raw(width, height, photon_img.get_raw_pixels())?;
        let gain = self.intensity.max(0.0) * EDGE_GAIN;

        for (pixel, original) in result.pixels_mut().zip(image.pixels()) {
            for i in 0..3 {
                pixel[i] = (pixel[i] as f32 * gain).clamp(0.0, 255.0) as u8;
            }
            pixel[3] = original[3];
        }

        Some(result)
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PixelateConfig {
    // Block edge in pixels, rounded
    #[derivative(Default(value = "8.0"))]
    scale: f32,
}

impl PixelateConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for PixelateConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let block_size = self.scale.round() as i32;
        if block_size <= 1 {
            return Some(image);
        }

        let (width, height) = (image.width(), image.height());
        let mut photon_img = PhotonImage::new(image.into_raw(), width, height);
        photon_rs::effects::pixelize(&mut photon_img, block_size);
        RgbaImage::from_raw(width, height, photon_img.get_raw_pixels())
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub(crate) struct PosterizeConfig {
    #[derivative(Default(value = "4"))]
    levels: u8,
}

impl PosterizeConfig {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Effect for PosterizeConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let levels = self.levels.max(2) as f32;
        let step = 255.0 / (levels - 1.0);

        let mut result = image;

        for pixel in result.pixels_mut() {
            for i in 0..3 {
                pixel[i] = ((pixel[i] as f32 / step).round() * step).clamp(0.0, 255.0) as u8;
            }
        }

        Some(result)
    }
}

/// Flat-shaded polygons: every pixel takes the color of the nearest cell seed.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CrystallizeConfig {
    // Cell size in pixels
    #[derivative(Default(value = "20.0"))]
    radius: f32,
}

impl CrystallizeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for CrystallizeConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        if self.radius < 1.0 || !self.radius.is_finite() {
            return Some(image);
        }

        let (width, height) = (image.width(), image.height());
        let cell = self.radius;
        let mut pixels = vec![0u8; width as usize * height as usize * 4];

        pixels
            .par_chunks_mut(width as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, chunk) in row.chunks_mut(4).enumerate() {
                    let (sx, sy) = nearest_seed(x as f32, y as f32, cell);
                    let sx = (sx as i64).clamp(0, width as i64 - 1) as u32;
                    let sy = (sy as i64).clamp(0, height as i64 - 1) as u32;
                    chunk.copy_from_slice(&image.get_pixel(sx, sy).0);
                }
            });

        RgbaImage::from_raw(width, height, pixels)
    }
}

// A seed three cells away is always farther than the seed of the own cell,
// so two rings of neighbours hold the nearest one.
fn nearest_seed(x: f32, y: f32, cell: f32) -> (f32, f32) {
    let (cx, cy) = ((x / cell).floor() as i64, (y / cell).floor() as i64);
    let mut nearest = (f32::MAX, 0.0, 0.0);

    for ny in cy - 2..=cy + 2 {
        for nx in cx - 2..=cx + 2 {
            let (sx, sy) = cell_seed(nx, ny, cell);
            let (dx, dy) = (sx - x, sy - y);
            let distance = dx * dx + dy * dy;

            if distance < nearest.0 {
                nearest = (distance, sx, sy);
            }
        }
    }

    (nearest.1, nearest.2)
}

fn cell_seed(cx: i64, cy: i64, cell: f32) -> (f32, f32) {
    let jitter_x = hash_unit(cx, cy, 0x9e37_79b9);
    let jitter_y = hash_unit(cx, cy, 0x85eb_ca6b);
    ((cx as f32 + jitter_x) * cell, (cy as f32 + jitter_y) * cell)
}

// Deterministic value in [0, 1) for a cell coordinate
fn hash_unit(x: i64, y: i64, salt: u64) -> f32 {
    let mut h = (x as u64).wrapping_mul(0x27d4_eb2f_1656_67c5)
        ^ (y as u64).wrapping_mul(0x1656_67b1_9e37_79f9)
        ^ salt;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    (h >> 40) as f32 / (1u64 << 24) as f32
}

/// Posterized colors with dark outlines along strong edges.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ComicConfig {
    #[derivative(Default(value = "5"))]
    levels: u8,

    // Sobel magnitude above which a pixel becomes an outline
    #[derivative(Default(value = "160"))]
    edge_threshold: u16,
}

impl ComicConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ComicConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let gray = image::imageops::grayscale(&image);
        let gradients = imageproc::gradients::sobel_gradients(&gray);

        let mut result = PosterizeConfig::new()
            .with_levels(self.levels)
            .apply(image)?;

        for (pixel, gradient) in result.pixels_mut().zip(gradients.pixels()) {
            if gradient[0] > self.edge_threshold {
                *pixel = Rgba([0, 0, 0, pixel[3]]);
            }
        }

        Some(result)
    }
}
