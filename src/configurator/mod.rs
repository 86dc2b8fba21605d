//! The one object a front end talks to.
//!
//! Buttons, scripts or network messages turn into [`Action`]s; the renderer
//! reports asset arrival, ticks and finished loads. Every call takes
//! `&mut self`, so each action lands completely between two ticks.

use crate::animation::{AnimationController, ClipPlaybackState};
use crate::assets::AssetRegistry;
use crate::camera::{CameraDirector, ViewPreset};
use crate::config::{NotReadyPolicy, Settings, CAMERA_FOV_DEG};
use crate::error::{ConfiguratorError, Result};
use crate::lighting::{LightingController, LightingState};
use crate::materials::MaterialController;
use crate::render::{
    EnvironmentHandle, LoadCompletion, LoadSlot, LoadTicket, Renderer, TextureHandle,
};
use crate::scene::LoadedScene;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ToggleClip { clip: String },
    ResetAll,
    ApplySwatch { texture_path: String },
    ApplyNamedSwatch { swatch: String },
    ResetMaterial,
    SetBulb { on: bool },
    SetNight { on: bool },
    GoToView { preset: ViewPreset },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Applied,
    /// Held until the asset finishes loading.
    Queued,
}

pub struct Configurator<R: Renderer> {
    settings: Settings,
    renderer: R,
    registry: AssetRegistry,
    animation: AnimationController,
    materials: MaterialController,
    lighting: LightingController,
    camera: CameraDirector,
    pending: VecDeque<Action>,
}

impl<R: Renderer> Configurator<R> {
    pub fn new(settings: Settings, mut renderer: R) -> Self {
        let mut lighting = LightingController::new();
        lighting.start(&mut renderer, &settings.environments);
        let camera = CameraDirector::new();
        renderer.set_camera(&camera.pose());
        Self {
            settings,
            renderer,
            registry: AssetRegistry::new(),
            animation: AnimationController::new(),
            materials: MaterialController::new(),
            lighting,
            camera,
            pending: VecDeque::new(),
        }
    }

    /// Takes over a freshly loaded lamp: registers it, frames the camera on
    /// the support, unifies the support material with the shade and replays
    /// any queued actions. On failure the configurator stays not-ready.
    pub fn on_asset_loaded(&mut self, scene: &LoadedScene) -> Result<()> {
        self.registry.register_asset(scene, &self.settings)?;
        if let Err(err) = self.attach_controllers() {
            log::warn!("Asset rejected during setup: {err}");
            self.detach_controllers();
            self.registry.teardown();
            return Err(err);
        }
        log::info!("Configurator ready");
        self.replay_pending();
        Ok(())
    }

    fn attach_controllers(&mut self) -> Result<()> {
        self.animation.attach(&self.registry)?;
        self.materials.attach(&self.registry, &self.settings)?;
        self.lighting
            .attach(&self.registry, &self.settings.nodes, &mut self.renderer)?;

        let bounds = self.registry.support_bounds()?;
        let pose = self.camera.fit_to_bounds(&bounds, CAMERA_FOV_DEG);
        self.renderer.set_camera(&pose);

        self.materials.propagate_to_supports()?;
        self.materials.flush(&mut self.renderer);
        Ok(())
    }

    fn detach_controllers(&mut self) {
        self.animation.detach();
        self.materials.detach();
        self.lighting.detach();
    }

    /// Drops the asset and returns to the not-ready state.
    pub fn unload(&mut self) {
        self.detach_controllers();
        self.registry.teardown();
    }

    pub fn is_ready(&self) -> bool {
        self.registry.is_ready()
    }

    pub fn on_tick(&mut self, dt: f32) {
        for sample in self.animation.advance(dt) {
            if let Some(clip) = self.registry.clip(sample.clip) {
                self.renderer.sample_clip(clip, sample.local_time);
            }
        }
        if self.camera.advance(dt) {
            self.renderer.set_camera(&self.camera.pose());
        }
    }

    /// Routes a finished load to its owner. Returns whether it was applied;
    /// stale results are logged and dropped.
    pub fn on_load_completed(&mut self, completion: LoadCompletion) -> bool {
        match completion {
            LoadCompletion::Texture(ticket, texture) => self.on_texture_loaded(&ticket, texture),
            LoadCompletion::Environment(ticket, environment) => {
                self.on_environment_loaded(&ticket, environment)
            }
        }
    }

    pub fn on_environment_loaded(
        &mut self,
        ticket: &LoadTicket,
        environment: EnvironmentHandle,
    ) -> bool {
        match self
            .lighting
            .complete_environment(&mut self.renderer, ticket, environment)
        {
            Ok(()) => {
                log::debug!("Applied {}", ticket.path);
                true
            }
            Err(err) => {
                log_discarded(ticket, &err);
                false
            }
        }
    }

    pub fn on_texture_loaded(&mut self, ticket: &LoadTicket, texture: TextureHandle) -> bool {
        let LoadSlot::Swatch { surface } = &ticket.slot else {
            log::warn!("Texture {} arrived for a non-swatch slot", ticket.path);
            return false;
        };
        if ticket.epoch != self.materials.epoch() {
            let err = ConfiguratorError::StaleAsyncResult {
                ticket_epoch: ticket.epoch,
                current_epoch: self.materials.epoch(),
            };
            log_discarded(ticket, &err);
            return false;
        }
        let applied = self
            .materials
            .apply_swatch(surface, texture)
            .and_then(|_| self.materials.propagate_to_supports());
        match applied {
            Ok(()) => {
                self.materials.flush(&mut self.renderer);
                true
            }
            Err(err) => {
                log_discarded(ticket, &err);
                false
            }
        }
    }

    /// Runs `action`, or queues/rejects it per [`NotReadyPolicy`] while the
    /// asset is still loading.
    pub fn dispatch(&mut self, action: Action) -> Result<Dispatched> {
        if !self.registry.is_ready() {
            return match self.settings.not_ready_policy {
                NotReadyPolicy::Reject => {
                    log::debug!("Rejected {:?}: asset not ready", action);
                    Err(ConfiguratorError::AssetNotReady)
                }
                NotReadyPolicy::Queue => {
                    log::info!("Queued {:?} until the asset is ready", action);
                    self.pending.push_back(action);
                    Ok(Dispatched::Queued)
                }
            };
        }
        self.apply(action)?;
        Ok(Dispatched::Applied)
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::ToggleClip { clip } => {
                let id = self.registry.resolve_clip(&clip)?;
                let phase = self.animation.toggle(id)?;
                log::info!("{clip}: {phase:?}");
            }
            Action::ResetAll => {
                let snapshot = self.registry.support_snapshot()?;
                self.animation.reset_all();
                self.renderer.restore_transforms(&snapshot.transforms);
                log::info!("Lamp reset to its assembled pose");
            }
            Action::ApplySwatch { texture_path } => self.request_swatch(texture_path)?,
            Action::ApplyNamedSwatch { swatch } => {
                let path = self
                    .settings
                    .swatches
                    .get(&swatch)
                    .cloned()
                    .ok_or(ConfiguratorError::UnknownSwatch(swatch))?;
                self.request_swatch(path)?;
            }
            Action::ResetMaterial => {
                self.materials.reset_to_default(&self.settings.nodes.shade)?;
                self.materials.propagate_to_supports()?;
                self.materials.begin_request();
                self.materials.flush(&mut self.renderer);
            }
            Action::SetBulb { on } => self.lighting.set_bulb(&mut self.renderer, on)?,
            Action::SetNight { on } => {
                self.lighting
                    .set_night(&mut self.renderer, &self.settings.environments, on)?;
            }
            Action::GoToView { preset } => self.camera.go_to(preset),
        }
        Ok(())
    }

    fn request_swatch(&mut self, path: String) -> Result<()> {
        let surface = self.settings.nodes.shade.clone();
        self.materials.surface_handle(&surface)?;
        let epoch = self.materials.begin_request();
        log::debug!("Requesting swatch {path} for {surface}");
        self.renderer.request_texture(LoadTicket {
            epoch,
            slot: LoadSlot::Swatch { surface },
            path,
        });
        Ok(())
    }

    fn replay_pending(&mut self) {
        let queued: Vec<Action> = self.pending.drain(..).collect();
        if !queued.is_empty() {
            log::info!("Replaying {} queued action(s)", queued.len());
        }
        for action in queued {
            if let Err(err) = self.apply(action.clone()) {
                log::warn!("Queued {:?} failed: {err}", action);
            }
        }
    }

    pub fn toggle_clip(&mut self, clip: &str) -> Result<Dispatched> {
        self.dispatch(Action::ToggleClip {
            clip: clip.to_string(),
        })
    }

    pub fn reset_all(&mut self) -> Result<Dispatched> {
        self.dispatch(Action::ResetAll)
    }

    pub fn apply_swatch(&mut self, texture_path: &str) -> Result<Dispatched> {
        self.dispatch(Action::ApplySwatch {
            texture_path: texture_path.to_string(),
        })
    }

    pub fn apply_named_swatch(&mut self, swatch: &str) -> Result<Dispatched> {
        self.dispatch(Action::ApplyNamedSwatch {
            swatch: swatch.to_string(),
        })
    }

    pub fn reset_material(&mut self) -> Result<Dispatched> {
        self.dispatch(Action::ResetMaterial)
    }

    pub fn set_bulb(&mut self, on: bool) -> Result<Dispatched> {
        self.dispatch(Action::SetBulb { on })
    }

    pub fn set_night(&mut self, on: bool) -> Result<Dispatched> {
        self.dispatch(Action::SetNight { on })
    }

    pub fn go_to_view(&mut self, preset: ViewPreset) -> Result<Dispatched> {
        self.dispatch(Action::GoToView { preset })
    }

    /// Manual camera navigation (drag / wheel).
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32, zoom_delta: f32) {
        self.camera.orbit(yaw_delta, pitch_delta, zoom_delta);
        self.renderer.set_camera(&self.camera.pose());
    }

    pub fn clip_state(&self, clip: &str) -> Result<ClipPlaybackState> {
        let id = self.registry.resolve_clip(clip)?;
        self.animation
            .state(id)
            .ok_or_else(|| ConfiguratorError::UnknownClip(clip.to_string()))
    }

    pub fn lighting_state(&self) -> LightingState {
        self.lighting.state()
    }

    pub fn pending_actions(&self) -> usize {
        self.pending.len()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn materials(&self) -> &MaterialController {
        &self.materials
    }

    pub fn lighting(&self) -> &LightingController {
        &self.lighting
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

fn log_discarded(ticket: &LoadTicket, err: &ConfiguratorError) {
    log::debug!("Discarded {} ({:?}): {err}", ticket.path, ticket.slot);
}
