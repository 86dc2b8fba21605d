//! Boundary to the engine that actually draws the lamp.
//!
//! The configurator never talks to a GPU, a window or a file decoder. It
//! pushes scene mutations through [`Renderer`] and asks it to fetch textures
//! and environment maps. Fetches complete later, in any order, and are handed
//! back to [`crate::configurator::Configurator::on_load_completed`] together
//! with the [`LoadTicket`] they were requested with.

mod headless;

pub use headless::HeadlessRenderer;

use crate::assets::{AnimationClip, NodeHandle};
use crate::camera::CameraPose;
use crate::materials::MaterialHandle;
use crate::scene::NodeTransform;

/// Opaque texture produced by the renderer's loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque prefiltered environment map produced by the renderer's loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Color([f32; 3]),
    Map(EnvironmentHandle),
}

/// Where a finished load ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSlot {
    Environment,
    Background,
    Swatch { surface: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    /// Epoch of the owning controller when the request was issued.
    pub epoch: u64,
    pub slot: LoadSlot,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadCompletion {
    Texture(LoadTicket, TextureHandle),
    Environment(LoadTicket, EnvironmentHandle),
}

pub trait Renderer {
    /// Starts a texture fetch. Completion is reported as [`LoadCompletion::Texture`].
    fn request_texture(&mut self, ticket: LoadTicket);

    /// Starts an environment fetch. Completion is reported as
    /// [`LoadCompletion::Environment`].
    fn request_environment(&mut self, ticket: LoadTicket);

    fn set_light_intensity(&mut self, node: NodeHandle, intensity: f32);

    fn set_emissive(&mut self, node: NodeHandle, rgb: [f32; 3]);

    fn set_environment(&mut self, environment: EnvironmentHandle);

    fn set_background(&mut self, background: &Background);

    /// Binds `material` to `node` and flags it for re-upload.
    fn set_material(&mut self, node: NodeHandle, material: &MaterialHandle);

    fn set_camera(&mut self, pose: &CameraPose);

    /// Poses the clip's target nodes at `local_time` seconds into the clip.
    fn sample_clip(&mut self, clip: &AnimationClip, local_time: f32);

    fn restore_transforms(&mut self, transforms: &[(NodeHandle, NodeTransform)]);
}
