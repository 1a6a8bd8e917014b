pub mod blur;
pub mod distortion;
pub mod filter;
pub mod stylized;

use image::RgbaImage;

pub type ImageEffectResult<T> = Result<T, ImageEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageEffectError {
    #[error("No output from {0}")]
    NoOutput(String),
    #[error("Empty image: {0}x{1}")]
    EmptyImage(u32, u32),
}

/// Every effect consumes the source and returns a new image with the same
/// dimensions, or `None` when the pixel buffer could not be rebuilt.
pub trait Effect {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage>;
}

#[derive(Debug, Clone)]
pub enum ImageEffect {
    // Blur effects
    GaussianBlur(blur::GaussianBlurConfig),
    UnsharpMask(blur::UnsharpMaskConfig),

    // Filter effects
    Sepia(filter::SepiaConfig),
    Vignette(filter::VignetteConfig),

    // Stylized effects
    EdgeDetection(stylized::EdgeDetectionConfig),
    Pixelate(stylized::PixelateConfig),
    Crystallize(stylized::CrystallizeConfig),
    Comic(stylized::ComicConfig),

    // Distortion effects
    BumpDistortion(distortion::BumpDistortionConfig),
    Kaleidoscope(distortion::KaleidoscopeConfig),
}

impl Effect for ImageEffect {
    fn apply(&self, image: RgbaImage) -> Option<RgbaImage> {
        match self {
            ImageEffect::GaussianBlur(config) => config.apply(image),
            ImageEffect::UnsharpMask(config) => config.apply(image),

            ImageEffect::Sepia(config) => config.apply(image),
            ImageEffect::Vignette(config) => config.apply(image),

            ImageEffect::EdgeDetection(config) => config.apply(image),
            ImageEffect::Pixelate(config) => config.apply(image),
            ImageEffect::Crystallize(config) => config.apply(image),
            ImageEffect::Comic(config) => config.apply(image),

            ImageEffect::BumpDistortion(config) => config.apply(image),
            ImageEffect::Kaleidoscope(config) => config.apply(image),
        }
    }
}

impl ImageEffect {
    /// Applies the effect after checking the image has pixels to work on.
    pub fn try_apply(&self, image: RgbaImage) -> ImageEffectResult<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageEffectError::EmptyImage(width, height));
        }

        log::trace!("apply {self:?} to {width}x{height}");

        self.apply(image)
            .ok_or_else(|| ImageEffectError::NoOutput(format!("{self:?}")))
    }
}

/// Linear blend of `effect` over `original` by `amount` in [0, 1], alpha kept
/// from the original.
pub(crate) fn blend(original: &RgbaImage, effect: &RgbaImage, amount: f32) -> Option<RgbaImage> {
    let amount = amount.clamp(0.0, 1.0);
    let mut pixels = Vec::with_capacity(original.as_raw().len());

    for (original, effect) in original.pixels().zip(effect.pixels()) {
        for i in 0..3 {
            pixels.push(
                (original[i] as f32 * (1.0 - amount) + effect[i] as f32 * amount).round() as u8,
            );
        }
        pixels.push(original[3]);
    }

    RgbaImage::from_raw(original.width(), original.height(), pixels)
}
