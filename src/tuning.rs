//! Data-driven collision thresholds
//!
//! Every field defaults to the matching constant in [`crate::consts`], so a
//! partial JSON document only overrides what it names. Persisted in
//! LocalStorage next to the player settings.

use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::consts::*;

/// Runtime-tunable collision parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    // === Classification ===
    pub gravity_scale: f64,
    pub capture_mass_ratio: f64,
    pub fragmentation_speed_factor: f64,
    pub grazing_impact_parameter: f64,

    // === Fragmentation ===
    pub fallback_energy: f64,
    pub fragment_energy_scale: f64,
    pub max_fragments: usize,
    pub debris_mass_fraction: f64,
    pub debris_density_scale: f64,

    // === Bounce ===
    pub bounce_max_vertical_speed: f64,
    pub bounce_vertical_damping: f64,
    pub bounce_separation_factor: f64,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            gravity_scale: GRAVITY_SCALE,
            capture_mass_ratio: CAPTURE_MASS_RATIO,
            fragmentation_speed_factor: FRAGMENTATION_SPEED_FACTOR,
            grazing_impact_parameter: GRAZING_IMPACT_PARAMETER,

            fallback_energy: FALLBACK_ENERGY,
            fragment_energy_scale: FRAGMENT_ENERGY_SCALE,
            max_fragments: MAX_FRAGMENTS,
            debris_mass_fraction: DEBRIS_MASS_FRACTION,
            debris_density_scale: DEBRIS_DENSITY_SCALE,

            bounce_max_vertical_speed: BOUNCE_MAX_VERTICAL_SPEED,
            bounce_vertical_damping: BOUNCE_VERTICAL_DAMPING,
            bounce_separation_factor: BOUNCE_SEPARATION_FACTOR,
        }
    }
}

impl CollisionTuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cosmic_garden_tuning";

    /// Parse tuning from JSON, falling back to defaults for missing keys
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replace values that would break the resolver with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        fn positive(value: &mut f64, default: f64, name: &str) {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("Tuning '{}' = {} is invalid, using {}", name, value, default);
                *value = default;
            }
        }

        positive(&mut self.gravity_scale, defaults.gravity_scale, "gravity_scale");
        positive(
            &mut self.capture_mass_ratio,
            defaults.capture_mass_ratio,
            "capture_mass_ratio",
        );
        positive(
            &mut self.fragmentation_speed_factor,
            defaults.fragmentation_speed_factor,
            "fragmentation_speed_factor",
        );
        positive(&mut self.fallback_energy, defaults.fallback_energy, "fallback_energy");
        positive(
            &mut self.fragment_energy_scale,
            defaults.fragment_energy_scale,
            "fragment_energy_scale",
        );
        positive(
            &mut self.debris_density_scale,
            defaults.debris_density_scale,
            "debris_density_scale",
        );
        positive(
            &mut self.bounce_separation_factor,
            defaults.bounce_separation_factor,
            "bounce_separation_factor",
        );

        self.grazing_impact_parameter = self.grazing_impact_parameter.clamp(0.0, 1.0);
        self.debris_mass_fraction = self.debris_mass_fraction.clamp(0.0, 1.0);
        self.bounce_vertical_damping = self.bounce_vertical_damping.clamp(0.0, 1.0);
        self.bounce_max_vertical_speed = self.bounce_max_vertical_speed.abs();
        // Fragment work stays bounded no matter what the config says
        self.max_fragments = self.max_fragments.clamp(MIN_FRAGMENTS, MAX_FRAGMENTS);

        self
    }

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded collision tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Save tuning to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
