use filter_session::{FilterEngine, FilterInputs, FilterKind};
use image::RgbaImage;
use image_effect::{
    ImageEffect,
    blur::{GaussianBlurConfig, UnsharpMaskConfig},
    distortion::{BumpDistortionConfig, KaleidoscopeConfig},
    filter::{SepiaConfig, VignetteConfig},
    stylized::{ComicConfig, CrystallizeConfig, EdgeDetectionConfig, PixelateConfig},
};
use log::warn;

/// Sets the named input on the config when the session passed one.
macro_rules! with_input {
    ($config:expr, $value:expr, $setter:ident) => {
        match $value {
            Some(v) => $config.$setter(v),
            None => $config,
        }
    };
}

/// Renders through the `image-effect` library.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectEngine;

impl EffectEngine {
    pub fn effect_for(kind: FilterKind, inputs: &FilterInputs) -> ImageEffect {
        match kind {
            FilterKind::Crystallize => ImageEffect::Crystallize(with_input!(
                CrystallizeConfig::new(),
                inputs.radius,
                with_radius
            )),
            FilterKind::Edges => ImageEffect::EdgeDetection(with_input!(
                EdgeDetectionConfig::new(),
                inputs.intensity,
                with_intensity
            )),
            FilterKind::GaussianBlur => ImageEffect::GaussianBlur(with_input!(
                GaussianBlurConfig::new(),
                inputs.radius,
                with_radius
            )),
            FilterKind::Pixellate => ImageEffect::Pixelate(with_input!(
                PixelateConfig::new(),
                inputs.scale,
                with_scale
            )),
            FilterKind::SepiaTone => ImageEffect::Sepia(with_input!(
                SepiaConfig::new(),
                inputs.intensity,
                with_intensity
            )),
            FilterKind::UnsharpMask => {
                let config = with_input!(UnsharpMaskConfig::new(), inputs.intensity, with_intensity);
                ImageEffect::UnsharpMask(with_input!(config, inputs.radius, with_radius))
            }
            FilterKind::Vignette => {
                let config = with_input!(VignetteConfig::new(), inputs.intensity, with_intensity);
                ImageEffect::Vignette(with_input!(config, inputs.radius, with_radius))
            }
            FilterKind::BumpDistortion => {
                let config = with_input!(BumpDistortionConfig::new(), inputs.radius, with_radius);
                ImageEffect::BumpDistortion(with_input!(config, inputs.scale, with_scale))
            }
            FilterKind::ComicEffect => ImageEffect::Comic(ComicConfig::new()),
            FilterKind::Kaleidoscope => ImageEffect::Kaleidoscope(KaleidoscopeConfig::new()),
        }
    }
}

impl FilterEngine for EffectEngine {
    fn render(
        &self,
        kind: FilterKind,
        source: &RgbaImage,
        inputs: &FilterInputs,
    ) -> Option<RgbaImage> {
        let effect = Self::effect_for(kind, inputs);

        match effect.try_apply(source.clone()) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("{kind} failed: {e}");
                None
            }
        }
    }
}
