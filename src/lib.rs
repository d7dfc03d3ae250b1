//! Cosmic Garden - collision core for a universe gardening idle game
//!
//! Core modules:
//! - `sim`: Collision classification and resolution, live bodies, scene handles
//! - `tuning`: Data-driven collision thresholds
//! - `settings`: Player preferences (audio, notifications)
//! - `timeline`: Bounded event log shown in the timeline panel
//! - `audio`: Procedural collision sound cues (Web Audio, wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;
pub mod timeline;
pub mod tuning;

pub use error::SimError;
pub use settings::Settings;
pub use timeline::{LogCategory, TimelineLog};
pub use tuning::CollisionTuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum fixed steps per rendered frame
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravitational-strength scale used for escape velocities (not physical G)
    pub const GRAVITY_SCALE: f64 = 100.0;
    /// Mass ratio above which a slow impact is a capture
    pub const CAPTURE_MASS_RATIO: f64 = 10.0;
    /// Impact speed, in multiples of average escape velocity, that shatters bodies
    pub const FRAGMENTATION_SPEED_FACTOR: f64 = 2.0;
    /// Impact parameter above which a collision is grazing
    pub const GRAZING_IMPACT_PARAMETER: f64 = 0.8;

    /// Energy substituted when the computed one is not finite
    pub const FALLBACK_ENERGY: f64 = 1000.0;
    /// Energy per extra fragment (fragments = floor(sqrt(E / scale)) + 2)
    pub const FRAGMENT_ENERGY_SCALE: f64 = 1000.0;
    /// Minimum fragments produced by a shattering impact
    pub const MIN_FRAGMENTS: usize = 2;
    /// Hard cap on fragments per collision
    pub const MAX_FRAGMENTS: usize = 5;
    /// Share of the combined mass ejected as debris
    pub const DEBRIS_MASS_FRACTION: f64 = 0.3;
    /// Density scale for debris radii (r = (m / scale)^(1/3))
    pub const DEBRIS_DENSITY_SCALE: f64 = 100.0;

    /// Bounce: max vertical (Y) speed after the elastic exchange
    pub const BOUNCE_MAX_VERTICAL_SPEED: f64 = 50.0;
    /// Bounce: vertical damping factor applied after clamping
    pub const BOUNCE_VERTICAL_DAMPING: f64 = 0.3;
    /// Bounce: bodies are separated to this multiple of their combined radii
    pub const BOUNCE_SEPARATION_FACTOR: f64 = 1.1;
}

/// `m1 + m2`, saturating at `f64::MAX` instead of overflowing to infinity
#[inline]
pub fn combined_mass(m1: f64, m2: f64) -> f64 {
    (m1 + m2).min(f64::MAX)
}

/// Share of `m1` in `m1 + m2`, computed without forming the sum
#[inline]
pub fn mass_weight(m1: f64, m2: f64) -> f64 {
    1.0 / (1.0 + m2 / m1)
}

/// Cube root of a mass ratio, used for constant-density radius scaling
#[inline]
pub fn volume_scale(new_mass: f64, old_mass: f64) -> f64 {
    (new_mass / old_mass).cbrt()
}
