use crate::assets::{AssetRegistry, NodeHandle};
use crate::config::{
    EnvironmentPaths, NodeNames, BULB_EMISSIVE_RGB, BULB_POINT_INTENSITY, BULB_SPOT_INTENSITY,
    DAY_BACKGROUND_RGB, DAY_DIRECTIONAL_INTENSITY, NIGHT_DIRECTIONAL_INTENSITY,
    NIGHT_PANEL_INTENSITIES,
};
use crate::error::{ConfiguratorError, Result};
use crate::render::{Background, EnvironmentHandle, LoadSlot, LoadTicket, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightingState {
    pub bulb_on: bool,
    pub is_night: bool,
}

#[derive(Debug, Clone, Copy)]
struct LightRig {
    point: NodeHandle,
    spot: NodeHandle,
    directional: NodeHandle,
    panels: [NodeHandle; 2],
}

/// Bulb and day/night state of the stage.
#[derive(Debug)]
pub struct LightingController {
    state: LightingState,
    epoch: u64,
    rig: Option<LightRig>,
    environment: Option<EnvironmentHandle>,
    background: Background,
}

impl Default for LightingController {
    fn default() -> Self {
        Self {
            state: LightingState::default(),
            epoch: 0,
            rig: None,
            environment: None,
            background: Background::Color(DAY_BACKGROUND_RGB),
        }
    }
}

impl LightingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts up the day look. Needs no asset, so it runs before the lamp
    /// has finished loading.
    pub fn start(&mut self, renderer: &mut dyn Renderer, paths: &EnvironmentPaths) {
        renderer.set_background(&self.background);
        request_environment(renderer, self.epoch, LoadSlot::Environment, &paths.day);
    }

    /// Resolves the light nodes and pushes the current state onto them.
    pub fn attach(
        &mut self,
        registry: &AssetRegistry,
        names: &NodeNames,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let rig = LightRig {
            point: registry.resolve(&names.point_light)?,
            spot: registry.resolve(&names.spot_light)?,
            directional: registry.resolve(&names.directional_light)?,
            panels: [
                registry.resolve(&names.panel_lights[0])?,
                registry.resolve(&names.panel_lights[1])?,
            ],
        };
        let bulb = registry.resolve(&names.bulb)?;
        match registry.children(bulb).first() {
            Some(glass) => renderer.set_emissive(*glass, BULB_EMISSIVE_RGB),
            None => log::warn!("Bulb '{}' has no child to tint", names.bulb),
        }
        apply_bulb(renderer, &rig, self.state.bulb_on);
        apply_stage(renderer, &rig, self.state.is_night);
        self.rig = Some(rig);
        Ok(())
    }

    pub fn detach(&mut self) {
        self.rig = None;
    }

    fn rig(&self) -> Result<LightRig> {
        self.rig.ok_or(ConfiguratorError::AssetNotReady)
    }

    pub fn set_bulb(&mut self, renderer: &mut dyn Renderer, on: bool) -> Result<()> {
        let rig = self.rig()?;
        apply_bulb(renderer, &rig, on);
        self.state.bulb_on = on;
        log::debug!("Bulb {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Switches day/night. Light intensities change immediately; environment
    /// and background maps are requested and applied once they arrive, unless
    /// another switch has happened in the meantime.
    pub fn set_night(
        &mut self,
        renderer: &mut dyn Renderer,
        paths: &EnvironmentPaths,
        on: bool,
    ) -> Result<()> {
        let rig = self.rig()?;
        self.epoch = self.epoch.wrapping_add(1);
        self.state.is_night = on;
        apply_stage(renderer, &rig, on);
        if on {
            request_environment(renderer, self.epoch, LoadSlot::Environment, &paths.night);
            request_environment(
                renderer,
                self.epoch,
                LoadSlot::Background,
                &paths.night_background,
            );
        } else {
            request_environment(renderer, self.epoch, LoadSlot::Environment, &paths.day);
            self.background = Background::Color(DAY_BACKGROUND_RGB);
            renderer.set_background(&self.background);
        }
        log::debug!(
            "Stage switched to {} (epoch {})",
            if on { "night" } else { "day" },
            self.epoch
        );
        Ok(())
    }

    /// Applies a finished environment load if it still belongs to the
    /// current mode.
    pub fn complete_environment(
        &mut self,
        renderer: &mut dyn Renderer,
        ticket: &LoadTicket,
        environment: EnvironmentHandle,
    ) -> Result<()> {
        if ticket.epoch != self.epoch {
            return Err(ConfiguratorError::StaleAsyncResult {
                ticket_epoch: ticket.epoch,
                current_epoch: self.epoch,
            });
        }
        match ticket.slot {
            LoadSlot::Environment => {
                self.environment = Some(environment);
                renderer.set_environment(environment);
            }
            LoadSlot::Background => {
                self.background = Background::Map(environment);
                renderer.set_background(&self.background);
            }
            LoadSlot::Swatch { .. } => {
                log::warn!("Environment completion for swatch slot ignored: {}", ticket.path);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> LightingState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn environment(&self) -> Option<EnvironmentHandle> {
        self.environment
    }

    pub fn background(&self) -> Background {
        self.background
    }
}

fn request_environment(renderer: &mut dyn Renderer, epoch: u64, slot: LoadSlot, path: &str) {
    renderer.request_environment(LoadTicket {
        epoch,
        slot,
        path: path.to_string(),
    });
}

fn apply_bulb(renderer: &mut dyn Renderer, rig: &LightRig, on: bool) {
    let (point, spot) = if on {
        (BULB_POINT_INTENSITY, BULB_SPOT_INTENSITY)
    } else {
        (0.0, 0.0)
    };
    renderer.set_light_intensity(rig.point, point);
    renderer.set_light_intensity(rig.spot, spot);
}

fn apply_stage(renderer: &mut dyn Renderer, rig: &LightRig, night: bool) {
    let (panels, directional) = if night {
        (NIGHT_PANEL_INTENSITIES, NIGHT_DIRECTIONAL_INTENSITY)
    } else {
        ([0.0, 0.0], DAY_DIRECTIONAL_INTENSITY)
    };
    renderer.set_light_intensity(rig.panels[0], panels[0]);
    renderer.set_light_intensity(rig.panels[1], panels[1]);
    renderer.set_light_intensity(rig.directional, directional);
}
