//! Orbit demo: a sun, a planet and a moon driven through the scene core
//!
//! Runs a fixed number of headless frames, spinning the sun and the planet so
//! the moon's world position traces a nested orbit, and logs what a renderer
//! would receive each frame. Settings come from `scene.toml` when present.

use scene_core::foundation::logging;
use scene_core::prelude::*;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "scene.toml";
const PLANET_DISTANCE: f32 = 8.0;
const MOON_DISTANCE: f32 = 2.0;
const MOON_SCALE: f32 = 0.25;
const FRAME_TIME: f32 = 1.0 / 60.0;

/// Demo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    /// Scene sizing and frames in flight
    scene: SceneConfig,
    /// Frames to simulate
    frames: u32,
    /// Sun spin per frame, degrees around Y
    spin_degrees_per_frame: f32,
    /// Initial sun transform
    sun: TransformInfo,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            frames: 120,
            spin_degrees_per_frame: 3.0,
            sun: TransformInfo::default().with_uniform_scale(2.0),
        }
    }
}

impl Config for DemoConfig {}

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] EcsError),
}

/// Logs when the moon comes into being and every second of its life
struct MoonWatcher {
    elapsed: f32,
    next_report: f32,
}

impl ScriptBehaviour for MoonWatcher {
    fn begin(&mut self, entity: Entity) {
        log::info!("Moon {entity} started orbiting");
    }

    fn update(&mut self, entity: Entity, delta_time: f32) {
        self.elapsed += delta_time;
        if self.elapsed >= self.next_report {
            log::debug!("Moon {entity} has orbited for {:.1}s", self.elapsed);
            self.next_report += 1.0;
        }
    }

    fn destroyed(&mut self, entity: Entity) {
        log::info!("Moon {entity} left the system after {:.1}s", self.elapsed);
    }
}

struct OrbitApp {
    scene: Scene,
    config: DemoConfig,
    sun: Entity,
    planet: Entity,
    moon: Entity,
}

impl OrbitApp {
    fn new(config: DemoConfig) -> Result<Self, DemoError> {
        let mut scene = Scene::with_config(config.scene.clone());

        let sun = scene.spawn(None, config.sun)?;
        let planet = scene.spawn(Some(sun), TransformInfo::from_position(Vec3::new(PLANET_DISTANCE, 0.0, 0.0)))?;
        let moon = scene.spawn(
            Some(planet),
            TransformInfo::from_position(Vec3::new(MOON_DISTANCE, 0.0, 0.0)).with_uniform_scale(MOON_SCALE),
        )?;

        for (entity, name) in [(sun, "Sun"), (planet, "Planet"), (moon, "Moon")] {
            scene.add_component::<Geometry>(entity, Mesh::cube().into())?;
            if let Some(metadata) = scene.pool_mut::<Metadata>() {
                metadata.set_name(entity, name)?;
            }
        }
        scene.add_component::<Script>(
            moon,
            ScriptInfo::new(MoonWatcher {
                elapsed: 0.0,
                next_report: 0.0,
            }),
        )?;

        log::info!("Built orbit hierarchy: {} entities", scene.entity_count());
        Ok(Self {
            scene,
            config,
            sun,
            planet,
            moon,
        })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        let spin = self.config.spin_degrees_per_frame;

        for frame in 0..self.config.frames {
            #[allow(clippy::cast_precision_loss)]
            let angle = spin * frame as f32;
            let mut transforms = self.scene.transforms();
            transforms.set_rotation(self.sun, Vec3::new(0.0, angle, 0.0))?;
            transforms.set_rotation(self.planet, Vec3::new(0.0, angle * 4.0, 0.0))?;

            let report = self.scene.update(FRAME_TIME);
            let frame_data = extract(&self.scene);

            if frame % 30 == 0 {
                let moon = self.scene.transforms().world_position(self.moon)?;
                log::info!(
                    "Frame {frame}: moon at ({:.2}, {:.2}, {:.2}), {} refreshed, {} draws, {} constant bytes",
                    moon.x,
                    moon.y,
                    moon.z,
                    report.refreshed.len(),
                    frame_data.draws.len(),
                    frame_data.constants_bytes().len()
                );
            }
        }

        for (name, count) in self.scene.pool_stats() {
            log::debug!("Pool {name}: {count} rows");
        }

        // Takes the moon with it.
        self.scene.destroy_entity(self.planet)?;
        log::info!(
            "Planet destroyed, {} entities remain (moon alive: {})",
            self.scene.entity_count(),
            self.scene.is_alive(self.moon)
        );
        Ok(())
    }
}

fn main() -> Result<(), DemoError> {
    logging::init();
    log::info!("Starting orbit demo");

    let config = DemoConfig::load_or_default(CONFIG_PATH)?;
    let mut app = OrbitApp::new(config)?;
    app.run()?;

    log::info!("Orbit demo finished");
    Ok(())
}
