//! Audio system using Web Audio API
//!
//! Procedurally generated collision cues, no external files needed.

use glam::DVec3;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{SoundCue, SoundEvent};

/// Plays queued collision cues
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Camera position used for distance falloff
    listener: DVec3,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            listener: DVec3::ZERO,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_listener(&mut self, position: DVec3) {
        self.listener = position;
    }

    /// Play one queued cue
    pub fn play(&self, event: &SoundEvent) {
        let Some(vol) = event.volume_at(self.listener) else {
            return;
        };

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match event.cue {
            SoundCue::Merge => self.play_merge(ctx, vol),
            SoundCue::Absorb => self.play_absorb(ctx, vol),
            SoundCue::Shatter => self.play_shatter(ctx, vol),
            SoundCue::Bounce => self.play_bounce(ctx, vol),
            SoundCue::Destroy => self.play_destroy(ctx, vol),
        }
    }

    pub fn play_all(&self, events: &[SoundEvent]) {
        for event in events {
            self.play(event);
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Merge - low swelling hum
    fn play_merge(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.5, t + 0.15)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency().set_value_at_time(90.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(140.0, t + 0.6)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.7).ok();
    }

    /// Black hole absorption - ominous descend
    fn play_absorb(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.8)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(20.0, t + 0.8)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 1.0).ok();
    }

    /// Fragmentation - crunch with scattered ticks
    fn play_shatter(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.45, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.35)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.4).ok();
        }

        for (i, freq) in [1800.0, 1300.0, 2200.0].iter().enumerate() {
            let start = t + 0.04 * (i + 1) as f64;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.12, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.05)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.06).ok();
            }
        }
    }

    /// Bounce - short ping
    fn play_bounce(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Mutual destruction - boom
    fn play_destroy(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(100.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(30.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();

        // High frequency crack
        if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain2.gain().set_value_at_time(vol * 0.2, t).ok();
            gain2
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc2.start().ok();
            osc2.stop_with_when(t + 0.15).ok();
        }
    }
}
