use crate::{Effect, blend};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;
use photon_rs::{PhotonImage, monochrome};
use rayon::prelude::*;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SepiaConfig {
    // [0.0, 1.0]
    #[derivative(Default(value = "1.0"))]
    intensity: f32,
}

impl SepiaConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SepiaConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let (width, height) = (image.width(), image.height());
        let mut photon_img = PhotonImage::new(image.to_vec(), width, height);
        monochrome::sepia(&mut photon_img);
        let sepia = RgbaImage::from_raw(width, height, photon_img.get_raw_pixels())?;

        // If intensity is not 1.0, blend with original
        if self.intensity < 1.0 {
            blend(&image, &sepia, self.intensity)
        } else {
            Some(sepia)
        }
    }
}

/// Darkens the image outside a circle around the center.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct VignetteConfig {
    // [0.0, 1.0], how dark the corners get
    #[derivative(Default(value = "0.5"))]
    intensity: f32,

    // Pixels from the center that stay untouched
    #[derivative(Default(value = "10.0"))]
    radius: f32,
}

impl VignetteConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for VignetteConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        let width = image.width();
        let height = image.height();
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let max_distance = (center_x * center_x + center_y * center_y).sqrt();

        let strength = self.intensity.clamp(0.0, 1.0);
        let radius = self.radius.max(0.0).min(max_distance);
        let falloff = (max_distance - radius).max(1.0);

        let mut pixels = image.into_raw();
        let row_stride = width as usize * 4;

        pixels
            .par_chunks_mut(row_stride)
            .enumerate()
            .for_each(|(y, row)| {
                let dy = y as f32 - center_y;

                for (x, chunk) in row.chunks_mut(4).enumerate() {
                    let dx = x as f32 - center_x;
                    let distance = (dx * dx + dy * dy).sqrt();

                    let normalized = ((distance - radius).max(0.0) / falloff).min(1.0);
                    let factor = 1.0 - strength * normalized * normalized;

                    chunk[0] = (chunk[0] as f32 * factor) as u8;
                    chunk[1] = (chunk[1] as f32 * factor) as u8;
                    chunk[2] = (chunk[2] as f32 * factor) as u8;
                }
            });

        RgbaImage::from_raw(width, height, pixels)
    }
}
