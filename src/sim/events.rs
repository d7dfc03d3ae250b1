//! Fire-and-forget notifications raised by collisions
//!
//! The resolver talks to a [`Notifier`]; the game uses [`NotificationCenter`],
//! which filters by player settings and queues toasts and sound cues for the
//! frame loop to drain.

use glam::DVec3;
use serde::Serialize;

use crate::Settings;
use crate::timeline::{LogCategory, TimelineLog, now_ms};

/// How loud a toast is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Merges, absorptions, shattering impacts
    Major,
    /// Bounces and other routine contacts
    Minor,
}

/// Collision sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Two bodies fuse
    Merge,
    /// A black hole swallows a body
    Absorb,
    /// High-energy impact throws off debris
    Shatter,
    /// Grazing contact
    Bounce,
    /// Both bodies are lost
    Destroy,
}

/// A queued sound cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundEvent {
    pub cue: SoundCue,
    pub position: DVec3,
    pub volume: f32,
}

/// Distance at which a cue plays at half volume
pub const HALF_VOLUME_DISTANCE: f64 = 200.0;

impl SoundEvent {
    /// Volume heard from `listener`, or `None` when the cue is silent
    pub fn volume_at(&self, listener: DVec3) -> Option<f32> {
        let distance = self.position.distance(listener);
        let falloff = HALF_VOLUME_DISTANCE / (HALF_VOLUME_DISTANCE + distance);
        let vol = self.volume * falloff as f32;
        if !vol.is_finite() || vol <= 0.0 {
            return None;
        }
        Some(vol)
    }
}

/// Notification sinks used by the collision resolver
pub trait Notifier {
    /// Player-facing toast
    fn show_message(&mut self, text: &str, kind: ToastKind);
    /// Timeline panel entry
    fn timeline(&mut self, message: &str, category: LogCategory);
    /// Positional sound cue
    fn play_sound(&mut self, cue: SoundCue, position: DVec3);
}

/// Settings-aware notifier backing the game UI
#[derive(Debug, Default)]
pub struct NotificationCenter {
    pub settings: Settings,
    pub timeline: TimelineLog,
    toasts: Vec<String>,
    sounds: Vec<SoundEvent>,
}

impl NotificationCenter {
    pub fn new(settings: Settings, timeline: TimelineLog) -> Self {
        Self {
            settings,
            timeline,
            toasts: Vec::new(),
            sounds: Vec::new(),
        }
    }

    pub fn pending_toasts(&self) -> &[String] {
        &self.toasts
    }

    pub fn drain_toasts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.toasts)
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }
}

impl Notifier for NotificationCenter {
    fn show_message(&mut self, text: &str, kind: ToastKind) {
        log::info!("{}", text);
        let wanted = match kind {
            ToastKind::Major => self.settings.collision_toasts,
            ToastKind::Minor => self.settings.collision_toasts && self.settings.bounce_toasts,
        };
        if wanted {
            self.toasts.push(text.to_string());
        }
    }

    fn timeline(&mut self, message: &str, category: LogCategory) {
        if self.settings.timeline {
            self.timeline.push(message, category, now_ms());
        }
    }

    fn play_sound(&mut self, cue: SoundCue, position: DVec3) {
        let volume = self.settings.effective_sfx_volume();
        if volume > 0.0 {
            self.sounds.push(SoundEvent {
                cue,
                position,
                volume,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_toasts_filtered_by_default() {
        let mut center = NotificationCenter::default();
        center.show_message("A bounced off B", ToastKind::Minor);
        center.show_message("A merged with B", ToastKind::Major);

        assert_eq!(center.drain_toasts(), vec!["A merged with B".to_string()]);
        assert!(center.pending_toasts().is_empty());
    }

    #[test]
    fn test_muted_drops_sounds() {
        let mut center = NotificationCenter::default();
        center.settings.muted = true;
        center.play_sound(SoundCue::Merge, DVec3::ZERO);
        assert!(center.drain_sounds().is_empty());

        center.settings.muted = false;
        center.play_sound(SoundCue::Absorb, DVec3::X);
        let sounds = center.drain_sounds();
        assert_eq!(sounds.len(), 1);
        assert_eq!(sounds[0].cue, SoundCue::Absorb);
    }

    #[test]
    fn test_volume_falls_off_with_distance() {
        let event = SoundEvent {
            cue: SoundCue::Bounce,
            position: DVec3::new(200.0, 0.0, 0.0),
            volume: 0.8,
        };
        assert_eq!(event.volume_at(event.position), Some(0.8));
        let half = event.volume_at(DVec3::ZERO).unwrap();
        assert!((half - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_silent_or_invalid_volume_is_skipped() {
        let mut event = SoundEvent {
            cue: SoundCue::Merge,
            position: DVec3::ZERO,
            volume: 0.0,
        };
        assert_eq!(event.volume_at(DVec3::ZERO), None);

        for volume in [-1.0, f32::NAN, f32::INFINITY] {
            event.volume = volume;
            assert_eq!(event.volume_at(DVec3::ZERO), None);
        }

        // Unreachable listener
        event.volume = 1.0;
        assert_eq!(event.volume_at(DVec3::splat(f64::NAN)), None);
    }

    #[test]
    fn test_timeline_toggle() {
        let mut center = NotificationCenter::default();
        center.timeline("recorded", LogCategory::Collision);
        center.settings.timeline = false;
        center.timeline("skipped", LogCategory::Collision);

        assert_eq!(center.timeline.len(), 1);
        assert_eq!(center.timeline.latest().unwrap().message, "recorded");
    }
}
