//! Headless demo host: loads a lamp manifest, replays a timed action script
//! against it and reports the final configurator state.

mod timing;

use crate::config::{load_settings_from_file, Settings};
use crate::configurator::{Action, Configurator};
use crate::error::ConfiguratorError;
use crate::render::HeadlessRenderer;
use crate::scene::serialization::{load_scene_from_file, read_json, SerializationError};
use crate::scene::LoadedScene;
use timing::FrameTiming;

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Simulated latency of every texture and environment fetch.
const LOAD_LATENCY_SECONDS: f32 = 0.4;
const TARGET_HZ: f32 = 60.0;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: SerializationError,
    },
    #[error("lamp asset rejected: {0}")]
    Asset(#[from] ConfiguratorError),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ScriptStep {
    /// Seconds since start.
    pub at: f32,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DemoScript {
    /// How long the lamp takes to "download".
    pub asset_delay: f32,
    /// Extra time simulated after the last step.
    pub settle_seconds: f32,
    pub steps: Vec<ScriptStep>,
}

impl Default for DemoScript {
    fn default() -> Self {
        Self {
            asset_delay: 0.5,
            settle_seconds: 3.0,
            steps: Vec::new(),
        }
    }
}

impl DemoScript {
    fn end_time(&self) -> f32 {
        let last = self.steps.iter().map(|step| step.at).fold(0.0, f32::max);
        last.max(self.asset_delay) + self.settle_seconds
    }
}

pub fn load_script_from_file(path: &Path) -> Result<DemoScript, SerializationError> {
    let mut script: DemoScript = read_json(path)?;
    script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(script)
}

pub struct App {
    configurator: Configurator<HeadlessRenderer>,
    pending_scene: Option<LoadedScene>,
    script: DemoScript,
    next_step: usize,
    clock: f32,
}

impl App {
    pub fn new(settings: Settings, scene: LoadedScene, script: DemoScript) -> Self {
        Self {
            configurator: Configurator::new(settings, HeadlessRenderer::new(LOAD_LATENCY_SECONDS)),
            pending_scene: Some(scene),
            script,
            next_step: 0,
            clock: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next_step >= self.script.steps.len() && self.clock >= self.script.end_time()
    }

    /// Runs one frame of `dt` seconds: asset arrival, due script steps,
    /// finished loads, then the per-frame tick.
    pub fn frame(&mut self, dt: f32) -> Result<(), AppError> {
        self.clock += dt;

        if self.clock >= self.script.asset_delay {
            if let Some(scene) = self.pending_scene.take() {
                self.configurator.on_asset_loaded(&scene)?;
            }
        }

        while let Some(step) = self.script.steps.get(self.next_step) {
            if step.at > self.clock {
                break;
            }
            let action = step.action.clone();
            self.next_step += 1;
            match self.configurator.dispatch(action.clone()) {
                Ok(outcome) => log::info!("[{:6.2}s] {:?} -> {:?}", self.clock, action, outcome),
                Err(err) => log::warn!("[{:6.2}s] {:?} failed: {}", self.clock, action, err),
            }
        }

        for completion in self.configurator.renderer_mut().advance(dt) {
            self.configurator.on_load_completed(completion);
        }
        self.configurator.on_tick(dt);
        Ok(())
    }

    pub fn configurator(&self) -> &Configurator<HeadlessRenderer> {
        &self.configurator
    }

    fn report(&self) {
        let configurator = &self.configurator;
        let lighting = configurator.lighting_state();
        log::info!(
            "Bulb {}, {} mode",
            if lighting.bulb_on { "on" } else { "off" },
            if lighting.is_night { "night" } else { "day" }
        );
        for clip in &configurator.settings().clips {
            if let Ok(state) = configurator.clip_state(clip) {
                log::info!(
                    "Clip {:<28} {:?} at {:.2}s",
                    clip,
                    state.phase,
                    state.elapsed_seconds
                );
            }
        }
        let pose = configurator.camera().pose();
        log::info!(
            "Camera at [{:.2}, {:.2}, {:.2}] looking at [{:.2}, {:.2}, {:.2}]",
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.look_at.x,
            pose.look_at.y,
            pose.look_at.z
        );
        if let Some(shade) = configurator.materials().shade() {
            if let Some(material) = configurator.materials().current(shade) {
                let texture = material
                    .base_color_map
                    .and_then(|texture| configurator.renderer().path_of(texture.0));
                log::info!(
                    "Shade material '{}' (texture {})",
                    material.name,
                    texture.unwrap_or("none")
                );
            }
        }
    }
}

fn default_asset(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}

fn read<T>(path: &Path, load: impl Fn(&Path) -> Result<T, SerializationError>) -> Result<T, AppError> {
    load(path).map_err(|source| AppError::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Usage: `lamp-configurator [scene.json] [script.json] [settings.json]`
pub fn run(args: &[String]) -> Result<(), AppError> {
    let scene_path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_asset("lamp_scene.json"));
    let script_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_asset("demo_script.json"));

    let settings = match args.get(2) {
        Some(path) => read(Path::new(path), load_settings_from_file)?,
        None => Settings::default(),
    };
    let scene = read(&scene_path, load_scene_from_file)?;
    let script = read(&script_path, load_script_from_file)?;

    log::info!(
        "Lamp manifest {:?}: {} nodes, {} clips",
        scene_path,
        scene.nodes.len(),
        scene.clips.len()
    );
    log::info!(
        "Replaying {} step(s) from {:?} over {:.1}s",
        script.steps.len(),
        script_path,
        script.end_time()
    );

    let mut app = App::new(settings, scene, script);
    let mut timing = FrameTiming::new(TARGET_HZ);
    while !app.is_finished() {
        timing.wait_for_next_frame();
        timing.update(Instant::now());
        app.frame(timing.frame_dt)?;
    }
    app.report();
    Ok(())
}
