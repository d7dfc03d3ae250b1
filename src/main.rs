//! Cosmic Garden entry point
//!
//! On wasm32 this exports the `Garden` handle the page drives every frame.
//! Natively it runs a short headless collision demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_garden {
    use glam::DVec3;
    use wasm_bindgen::prelude::*;

    use cosmic_garden::audio::AudioManager;
    use cosmic_garden::consts::*;
    use cosmic_garden::sim::{
        BodyId, BodyKind, BodySpec, NotificationCenter, RngState, Universe, tick,
    };
    use cosmic_garden::{CollisionTuning, Settings, TimelineLog};

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Universe handle owned by the page
    #[wasm_bindgen]
    pub struct Garden {
        universe: Universe,
        audio: AudioManager,
        accumulator: f64,
    }

    #[wasm_bindgen]
    impl Garden {
        /// Without a seed one is drawn from browser entropy
        #[wasm_bindgen(constructor)]
        pub fn new(seed: Option<u64>) -> Garden {
            let seed = seed.unwrap_or_else(|| RngState::from_entropy().seed);
            let mut universe = Universe::with_tuning(seed, CollisionTuning::load());
            universe.notifications = NotificationCenter::new(Settings::load(), TimelineLog::load());
            log::info!("Garden created (seed {})", seed);
            Garden {
                universe,
                audio: AudioManager::new(),
                accumulator: 0.0,
            }
        }

        /// Spawn a body; `kind` is e.g. "planet" or "black_hole"
        #[allow(clippy::too_many_arguments)]
        pub fn spawn(
            &mut self,
            kind: &str,
            mass: f64,
            radius: f64,
            x: f64,
            y: f64,
            z: f64,
            vx: f64,
            vy: f64,
            vz: f64,
        ) -> Result<u32, JsValue> {
            let kind = BodyKind::from_name(kind)
                .ok_or_else(|| js_err(format!("unknown body kind '{}'", kind)))?;
            let spec = BodySpec::new(kind, mass, radius)
                .at(DVec3::new(x, y, z))
                .moving(DVec3::new(vx, vy, vz));
            let id = self.universe.spawn(spec).map_err(js_err)?;
            Ok(id.0)
        }

        pub fn remove(&mut self, id: u32) -> Result<(), JsValue> {
            self.universe.remove(BodyId(id)).map_err(js_err)
        }

        /// Resolve one collision now; returns the result as JSON
        pub fn collide(&mut self, a: u32, b: u32) -> Result<String, JsValue> {
            let result = self
                .universe
                .collide(BodyId(a), BodyId(b))
                .map_err(js_err)?;
            self.flush_sounds();
            serde_json::to_string(&result).map_err(js_err)
        }

        /// Run fixed steps for `dt` seconds of wall time; returns results as JSON
        pub fn update(&mut self, dt: f64) -> Result<String, JsValue> {
            self.accumulator += dt.min(0.1);

            let mut results = Vec::new();
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                results.extend(tick(&mut self.universe, SIM_DT));
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            if !results.is_empty() {
                self.flush_sounds();
                if self.universe.notifications.settings.timeline {
                    self.universe.notifications.timeline.save();
                }
            }
            serde_json::to_string(&results).map_err(js_err)
        }

        pub fn bodies_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(self.universe.bodies()).map_err(js_err)
        }

        pub fn timeline_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&self.universe.notifications.timeline).map_err(js_err)
        }

        /// Pending toasts as a JSON array, oldest first
        pub fn drain_toasts(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.universe.notifications.drain_toasts()).map_err(js_err)
        }

        pub fn set_listener(&mut self, x: f64, y: f64, z: f64) {
            self.audio.set_listener(DVec3::new(x, y, z));
        }

        /// Resume audio after the first user gesture
        pub fn resume_audio(&self) {
            self.audio.resume();
        }

        pub fn set_settings(&mut self, json: &str) -> Result<(), JsValue> {
            let settings: Settings = serde_json::from_str(json).map_err(js_err)?;
            settings.save();
            self.universe.notifications.settings = settings;
            Ok(())
        }

        pub fn set_tuning(&mut self, json: &str) -> Result<(), JsValue> {
            let tuning = CollisionTuning::from_json(json).map_err(js_err)?;
            tuning.save();
            self.universe.tuning = tuning;
            Ok(())
        }

        fn flush_sounds(&mut self) {
            let sounds = self.universe.notifications.drain_sounds();
            self.audio.play_all(&sounds);
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Cosmic Garden starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_garden::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cosmic Garden (native) starting...");
    log::info!("The garden runs in the browser - build the wasm32 target for the full game");

    println!("\nRunning collision demo...");
    if let Err(e) = run_demo() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// One of each outcome, then a few seconds of free drift
#[cfg(not(target_arch = "wasm32"))]
fn run_demo() -> Result<(), cosmic_garden::SimError> {
    use cosmic_garden::consts::SIM_DT;
    use cosmic_garden::sim::{BodyKind, BodySpec, Universe, tick};
    use glam::DVec3;

    let body = |kind, mass, radius, x: f64, z: f64, vx: f64, vz: f64| {
        BodySpec::new(kind, mass, radius)
            .at(DVec3::new(x, 0.0, z))
            .moving(DVec3::new(vx, 0.0, vz))
    };

    let mut universe = Universe::new(2024);

    let a = universe.spawn(body(BodyKind::Asteroid, 10.0, 2.0, 0.0, 0.0, 5.0, 0.0))?;
    let b = universe.spawn(body(BodyKind::Asteroid, 10.0, 2.0, 3.0, 0.0, -5.0, 0.0))?;
    let merged = universe.collide(a, b)?;
    println!("  {:<14} {}", merged.kind.as_str(), merged.message);

    let p = universe.spawn(body(BodyKind::Planet, 50.0, 2.0, 100.0, 0.0, 100.0, 0.0))?;
    let q = universe.spawn(body(BodyKind::Planet, 50.0, 2.0, 103.0, 0.0, -100.0, 0.0))?;
    let shattered = universe.collide(p, q)?;
    println!(
        "  {:<14} {} ({} fragments)",
        shattered.kind.as_str(),
        shattered.message,
        shattered.debris.len()
    );

    let m = universe.spawn(body(BodyKind::Moon, 20.0, 2.0, -100.0, 0.0, 0.0, 10.0))?;
    let n = universe.spawn(body(BodyKind::Moon, 20.0, 2.0, -96.2, 0.5, 0.0, -10.0))?;
    let bounced = universe.collide(m, n)?;
    println!("  {:<14} {}", bounced.kind.as_str(), bounced.message);

    let hole = universe.spawn(body(BodyKind::BlackHole, 500.0, 3.0, 0.0, 200.0, 0.0, 0.0))?;
    let star = universe.spawn(body(BodyKind::Star, 5000.0, 20.0, 0.0, 230.0, 0.0, -40.0))?;
    let mass_before = universe.total_mass();
    let mut collisions = 0;
    for _ in 0..(5.0 / SIM_DT) as usize {
        for result in tick(&mut universe, SIM_DT) {
            println!("  {:<14} {}", result.kind.as_str(), result.message);
            collisions += 1;
        }
    }
    log::info!(
        "Drift finished: {} collisions, {} bodies, mass {:.3} -> {:.3}",
        collisions,
        universe.bodies().len(),
        mass_before,
        universe.total_mass()
    );

    if universe.body(star).is_none() && universe.body(hole).is_some() {
        println!("✓ Black hole swallowed the star");
    }
    println!("✓ Collision demo finished ({} timeline entries)", universe.notifications.timeline.len());
    Ok(())
}
