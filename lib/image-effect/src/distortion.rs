//! Geometric effects that move pixels around rather than recoloring them.
//!
//! Both effects sample the source with nearest-neighbour lookups so the
//! output is byte-for-byte reproducible.

use crate::Effect;
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;
use rayon::prelude::*;
use std::f32::consts::PI;

/// Bulges (positive scale) or pinches (negative scale) a disc around the center.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BumpDistortionConfig {
    #[derivative(Default(value = "300.0"))]
    radius: f32,

    #[derivative(Default(value = "0.5"))]
    scale: f32,
}

impl BumpDistortionConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BumpDistortionConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        if self.radius <= 0.0 || !self.radius.is_finite() || self.scale == 0.0 {
            return Some(image);
        }

        let center_x = image.width() as f32 / 2.0;
        let center_y = image.height() as f32 / 2.0;
        let (radius, scale) = (self.radius, self.scale);

        remap(&image, |x, y| {
            let (dx, dy) = (x - center_x, y - center_y);
            let distance = (dx * dx + dy * dy).sqrt();
            if distance >= radius {
                return (x, y);
            }

            let falloff = 1.0 - distance / radius;
            let factor = (1.0 - scale * falloff * falloff).max(0.0);
            (center_x + dx * factor, center_y + dy * factor)
        })
    }
}

/// Mirrors one wedge of the image around the center `count` times.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct KaleidoscopeConfig {
    #[derivative(Default(value = "6"))]
    count: u32,

    // Radians
    #[derivative(Default(value = "0.0"))]
    angle: f32,
}

impl KaleidoscopeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for KaleidoscopeConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let count = self.count.max(1);
        let center_x = image.width() as f32 / 2.0;
        let center_y = image.height() as f32 / 2.0;
        let wedge = 2.0 * PI / count as f32;
        let angle = self.angle;

        remap(&image, |x, y| {
            let (dx, dy) = (x - center_x, y - center_y);
            let distance = (dx * dx + dy * dy).sqrt();

            let theta = (dy.atan2(dx) - angle).rem_euclid(2.0 * PI);
            let mut local = theta.rem_euclid(wedge);
            if (theta / wedge) as u32 % 2 == 1 {
                local = wedge - local;
            }

            let theta = local + angle;
            (
                center_x + distance * theta.cos(),
                center_y + distance * theta.sin(),
            )
        })
    }
}

// Builds the output by asking `source_of` where each destination pixel comes from.
fn remap<F>(image: &RgbaImage, source_of: F) -> Option<RgbaImage>
where
    F: Fn(f32, f32) -> (f32, f32) + Sync,
{
    let (width, height) = image.dimensions();
    let mut pixels = vec![0u8; width as usize * height as usize * 4];

    pixels
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, chunk) in row.chunks_mut(4).enumerate() {
                let (sx, sy) = source_of(x as f32, y as f32);
                let sx = (sx.round() as i64).clamp(0, width as i64 - 1) as u32;
                let sy = (sy.round() as i64).clamp(0, height as i64 - 1) as u32;
                chunk.copy_from_slice(&image.get_pixel(sx, sy).0);
            }
        });

    RgbaImage::from_raw(width, height, pixels)
}
