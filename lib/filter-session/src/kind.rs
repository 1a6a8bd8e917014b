use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::{fmt, str::FromStr};

/// One of the three parameter channels a filter may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Intensity,
    Radius,
    Scale,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Intensity, Slot::Radius, Slot::Scale];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::Intensity => "intensity",
            Slot::Radius => "radius",
            Slot::Scale => "scale",
        }
    }

    /// Inclusive range a value is clamped to before it is stored.
    pub fn range(&self) -> (f32, f32) {
        match self {
            Slot::Intensity => (0.0, 1.0),
            Slot::Radius => (0.0, 200.0),
            Slot::Scale => (0.0, 10.0),
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown parameter `{s}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FilterKind {
    Crystallize = 0,
    Edges,
    GaussianBlur,
    Pixellate,
    #[default]
    SepiaTone,
    UnsharpMask,
    Vignette,
    BumpDistortion,
    ComicEffect,
    Kaleidoscope,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Crystallize => "Crystallize",
            FilterKind::Edges => "Edges",
            FilterKind::GaussianBlur => "Gaussian Blur",
            FilterKind::Pixellate => "Pixellate",
            FilterKind::SepiaTone => "Sepia Tone",
            FilterKind::UnsharpMask => "Unsharp Mask",
            FilterKind::Vignette => "Vignette",
            FilterKind::BumpDistortion => "Bump Distortion",
            FilterKind::ComicEffect => "Comic Effect",
            FilterKind::Kaleidoscope => "Kaleidoscope",
        }
    }

    /// Parameter slots the filter reads. Fixed per variant.
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            FilterKind::Crystallize => &[Slot::Radius],
            FilterKind::Edges => &[Slot::Intensity],
            FilterKind::GaussianBlur => &[Slot::Radius],
            FilterKind::Pixellate => &[Slot::Scale],
            FilterKind::SepiaTone => &[Slot::Intensity],
            FilterKind::UnsharpMask => &[Slot::Intensity, Slot::Radius],
            FilterKind::Vignette => &[Slot::Intensity, Slot::Radius],
            FilterKind::BumpDistortion => &[Slot::Radius, Slot::Scale],
            FilterKind::ComicEffect => &[],
            FilterKind::Kaleidoscope => &[],
        }
    }

    pub fn accepts(&self, slot: Slot) -> bool {
        self.slots().contains(&slot)
    }

    /// Filters in picker order.
    pub fn all_filters() -> &'static [FilterKind] {
        &[
            FilterKind::Crystallize,
            FilterKind::Edges,
            FilterKind::GaussianBlur,
            FilterKind::Pixellate,
            FilterKind::SepiaTone,
            FilterKind::UnsharpMask,
            FilterKind::Vignette,
            FilterKind::BumpDistortion,
            FilterKind::ComicEffect,
            FilterKind::Kaleidoscope,
        ]
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the picker index, the display name, or the name without
/// separators, ignoring case: `2`, `Gaussian Blur`, `gaussian-blur`.
impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(index) = s.parse::<u8>() {
            return FilterKind::try_from(index).map_err(|_| format!("no filter at index {index}"));
        }

        let wanted = normalize(s);
        FilterKind::all_filters()
            .iter()
            .copied()
            .find(|kind| normalize(kind.name()) == wanted)
            .ok_or_else(|| format!("unknown filter `{s}`"))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
