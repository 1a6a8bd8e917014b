use crate::kind::{FilterKind, Slot};
use derivative::Derivative;

/// Slider values kept by the session. Each one only matters while the active
/// filter declares the matching slot.
///
/// Radius and scale start at 0.5 like intensity, even though their ranges are
/// far wider.
#[derive(Debug, Clone, Copy, PartialEq, Derivative)]
#[derivative(Default)]
pub struct FilterParameters {
    #[derivative(Default(value = "0.5"))]
    pub intensity: f32,

    #[derivative(Default(value = "0.5"))]
    pub radius: f32,

    #[derivative(Default(value = "0.5"))]
    pub scale: f32,
}

impl FilterParameters {
    pub fn get(&self, slot: Slot) -> f32 {
        match slot {
            Slot::Intensity => self.intensity,
            Slot::Radius => self.radius,
            Slot::Scale => self.scale,
        }
    }

    pub(crate) fn set(&mut self, slot: Slot, value: f32) {
        match slot {
            Slot::Intensity => self.intensity = value,
            Slot::Radius => self.radius = value,
            Slot::Scale => self.scale = value,
        }
    }

    /// Values handed to the engine: only the slots `kind` declares.
    pub fn inputs_for(&self, kind: FilterKind) -> FilterInputs {
        let pick = |slot| kind.accepts(slot).then(|| self.get(slot));

        FilterInputs {
            intensity: pick(Slot::Intensity),
            radius: pick(Slot::Radius),
            scale: pick(Slot::Scale),
        }
    }
}

/// Named parameters passed to a render. `None` means the slot is not set on
/// the filter and the engine uses its own default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterInputs {
    pub intensity: Option<f32>,
    pub radius: Option<f32>,
    pub scale: Option<f32>,
}

impl FilterInputs {
    pub fn get(&self, slot: Slot) -> Option<f32> {
        match slot {
            Slot::Intensity => self.intensity,
            Slot::Radius => self.radius,
            Slot::Scale => self.scale,
        }
    }

    /// `(name, value)` pairs of the slots that are set.
    pub fn named(&self) -> Vec<(&'static str, f32)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|v| (slot.name(), v)))
            .collect()
    }
}
