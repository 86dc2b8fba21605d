use crate::scene::serialization::{read_json, SerializationError};
use std::collections::BTreeMap;
use std::path::Path;

pub const BULB_POINT_INTENSITY: f32 = 3.0;
pub const BULB_SPOT_INTENSITY: f32 = 16.0;
pub const NIGHT_PANEL_INTENSITIES: [f32; 2] = [10.0, 150.0];
pub const NIGHT_DIRECTIONAL_INTENSITY: f32 = 0.75;
pub const DAY_DIRECTIONAL_INTENSITY: f32 = 1.0;

/// Flat background shown during the day (`#f4f3f1`).
pub const DAY_BACKGROUND_RGB: [f32; 3] = [244.0 / 255.0, 243.0 / 255.0, 241.0 / 255.0];
/// Emissive tint given to the bulb glass on load (`darkgrey`).
pub const BULB_EMISSIVE_RGB: [f32; 3] = [169.0 / 255.0, 169.0 / 255.0, 169.0 / 255.0];

pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_START_POSITION: [f32; 3] = [-14.0, 8.0, 20.0];
pub const PRESET_FLIGHT_SECONDS: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE: f32 = 30.0;
pub const ORBIT_MIN_DISTANCE: f32 = 5.0;
/// One full turn per minute.
pub const AUTO_ROTATE_RADIANS_PER_SECOND: f32 = std::f32::consts::TAU / 60.0;

/// What the configurator does with an action that arrives before the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReadyPolicy {
    #[default]
    Reject,
    Queue,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EnvironmentPaths {
    pub day: String,
    pub night: String,
    pub night_background: String,
}

impl Default for EnvironmentPaths {
    fn default() -> Self {
        Self {
            day: "assets/SceneEnvironments/StudioLighting_Day.hdr".to_string(),
            night: "assets/SceneEnvironments/StudioLighting_Night.hdr".to_string(),
            night_background: "assets/SceneEnvironments/StudioLighting_Night_World.hdr"
                .to_string(),
        }
    }
}

/// Names of the nodes the configurator drives directly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NodeNames {
    pub support: String,
    pub shade: String,
    pub bulb: String,
    pub point_light: String,
    pub spot_light: String,
    pub directional_light: String,
    pub panel_lights: [String; 2],
}

impl Default for NodeNames {
    fn default() -> Self {
        Self {
            support: "Support".to_string(),
            shade: "AbajurMesh".to_string(),
            bulb: "S_LightBulb".to_string(),
            point_light: "Point".to_string(),
            spot_light: "Spot".to_string(),
            directional_light: "DirectionalLight".to_string(),
            panel_lights: ["PanelLight1".to_string(), "PanelLight2".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model_path: String,
    pub environments: EnvironmentPaths,
    pub nodes: NodeNames,
    /// Nodes that mirror the shade material after load.
    pub support_nodes: Vec<String>,
    /// Surfaces a swatch may be applied to.
    pub swappable_surfaces: Vec<String>,
    pub clips: Vec<String>,
    pub swatches: BTreeMap<String, String>,
    pub not_ready_policy: NotReadyPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        let support_nodes = [
            "Support",
            "SupportJointHolder",
            "SupportJoint",
            "CircleJoint",
            "LongArm",
            "ShortArm",
            "ArmToAbajurJoint",
            "AbajurJoint",
            "AbajurMesh",
        ];
        let clips = [
            "SuporteAnimacao",
            "BracoLongoAnimacao",
            "BracoCurtoAnimacao",
            "EncaixeBracoCurtoAnimacao",
            "AbajurAnimacao",
        ];
        let mut swatches = BTreeMap::new();
        swatches.insert(
            "gold".to_string(),
            "assets/Materials/Metal/gold_1/gold_1_baseColor.jpeg".to_string(),
        );
        swatches.insert(
            "gold_normal".to_string(),
            "assets/Materials/Metal/gold_1/gold_1_normal.jpeg".to_string(),
        );
        Self {
            model_path: "assets/model/ApliqueArticuladoPecaUnica.gltf".to_string(),
            environments: EnvironmentPaths::default(),
            nodes: NodeNames::default(),
            support_nodes: support_nodes.iter().map(|name| name.to_string()).collect(),
            swappable_surfaces: vec!["AbajurMesh".to_string()],
            clips: clips.iter().map(|name| name.to_string()).collect(),
            swatches,
            not_ready_policy: NotReadyPolicy::Reject,
        }
    }
}

impl Settings {
    /// Every node name the loaded asset has to provide.
    pub fn required_nodes(&self) -> Vec<&str> {
        let nodes = &self.nodes;
        let mut required = vec![
            nodes.support.as_str(),
            nodes.shade.as_str(),
            nodes.bulb.as_str(),
            nodes.point_light.as_str(),
            nodes.spot_light.as_str(),
            nodes.directional_light.as_str(),
            nodes.panel_lights[0].as_str(),
            nodes.panel_lights[1].as_str(),
        ];
        for name in self.support_nodes.iter().chain(&self.swappable_surfaces) {
            if !required.contains(&name.as_str()) {
                required.push(name.as_str());
            }
        }
        required
    }

    pub fn required_clips(&self) -> Vec<&str> {
        self.clips.iter().map(String::as_str).collect()
    }
}

pub fn load_settings_from_file(path: &Path) -> Result<Settings, SerializationError> {
    read_json(path)
}
