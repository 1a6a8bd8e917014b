use crate::Effect;
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    // Standard deviation in pixels
    #[derivative(Default(value = "10.0"))]
    radius: f32,
}

impl GaussianBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GaussianBlurConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        // imageproc panics on a non-positive sigma
        if self.radius <= 0.0 || !self.radius.is_finite() {
            return Some(image);
        }

        Some(imageproc::filter::gaussian_blur_f32(&image, self.radius))
    }
}

/// Sharpens by adding back the difference between the image and a blurred copy.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct UnsharpMaskConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f32,

    #[derivative(Default(value = "2.5"))]
    radius: f32,
}

impl UnsharpMaskConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for UnsharpMaskConfig {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        if self.radius <= 0.0 || !self.radius.is_finite() || self.intensity == 0.0 {
            return Some(image);
        }

        let blurred = imageproc::filter::gaussian_blur_f32(&image, self.radius);
        let mut result = image;

        for (pixel, blurred) in result.pixels_mut().zip(blurred.pixels()) {
            for i in 0..3 {
                let original = pixel[i] as f32;
                let sharpened = original + self.intensity * (original - blurred[i] as f32);
                pixel[i] = sharpened.round().clamp(0.0, 255.0) as u8;
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::sample_image;

    #[test]
    fn test_gaussian_blur_zero_radius_is_identity() {
        let image = sample_image(12, 12);
        let output = GaussianBlurConfig::new()
            .with_radius(0.0)
            .apply(image.clone())
            .unwrap();
        assert_eq!(output, image);
    }

    #[test]
    fn test_gaussian_blur_softens_edges() {
        let image = sample_image(40, 40);
        let output = GaussianBlurConfig::new()
            .with_radius(3.0)
            .apply(image.clone())
            .unwrap();

        // Just inside the square the red channel is pulled towards the outside
        assert!(output.get_pixel(11, 20)[0] < image.get_pixel(11, 20)[0]);
    }

    #[test]
    fn test_unsharp_mask_flat_image_unchanged() {
        let image = RgbaImage::from_pixel(10, 10, image::Rgba([90, 120, 150, 255]));
        let output = UnsharpMaskConfig::new()
            .with_intensity(1.0)
            .apply(image.clone())
            .unwrap();

        for (out, src) in output.pixels().zip(image.pixels()) {
            for i in 0..4 {
                assert!((out[i] as i32 - src[i] as i32).abs() <= 1);
            }
        }
    }
}
