use super::{
    Background, EnvironmentHandle, LoadCompletion, LoadTicket, Renderer, TextureHandle,
};
use crate::assets::{AnimationClip, NodeHandle};
use crate::camera::CameraPose;
use crate::materials::MaterialHandle;
use crate::scene::NodeTransform;
use std::collections::HashMap;

#[derive(Debug)]
struct PendingLoad {
    completion: LoadCompletion,
    remaining: f32,
}

/// Renderer that draws nothing and records every mutation it receives.
///
/// Loads resolve after a fixed simulated latency (see [`HeadlessRenderer::advance`])
/// or on demand, so callers can deliver completions in whatever order they like.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    latency_seconds: f32,
    next_handle: u64,
    pending: Vec<PendingLoad>,
    requests: Vec<LoadTicket>,
    loaded_paths: HashMap<u64, String>,
    light_intensities: HashMap<NodeHandle, f32>,
    emissive: HashMap<NodeHandle, [f32; 3]>,
    environment: Option<EnvironmentHandle>,
    background: Option<Background>,
    materials: HashMap<NodeHandle, MaterialHandle>,
    material_uploads: usize,
    camera: Option<CameraPose>,
    samples: Vec<(String, f32)>,
    transforms: HashMap<NodeHandle, NodeTransform>,
    restore_count: usize,
}

impl HeadlessRenderer {
    pub fn new(latency_seconds: f32) -> Self {
        Self {
            latency_seconds: latency_seconds.max(0.0),
            next_handle: 1,
            ..Self::default()
        }
    }

    fn allocate(&mut self, path: &str) -> u64 {
        let id = self.next_handle.max(1);
        self.next_handle = id + 1;
        self.loaded_paths.insert(id, path.to_string());
        id
    }

    /// Moves simulated time forward and returns the loads that finished.
    pub fn advance(&mut self, dt: f32) -> Vec<LoadCompletion> {
        for load in &mut self.pending {
            load.remaining -= dt;
        }
        self.complete_matching(|_| true, true)
    }

    /// Finishes every outstanding load immediately, in request order.
    pub fn complete_all(&mut self) -> Vec<LoadCompletion> {
        self.complete_matching(|_| true, false)
    }

    /// Finishes the outstanding loads whose ticket satisfies `predicate`.
    pub fn complete_where(&mut self, predicate: impl Fn(&LoadTicket) -> bool) -> Vec<LoadCompletion> {
        self.complete_matching(predicate, false)
    }

    fn complete_matching(
        &mut self,
        predicate: impl Fn(&LoadTicket) -> bool,
        respect_latency: bool,
    ) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        let mut still_pending = Vec::new();
        for load in self.pending.drain(..) {
            let ticket = match &load.completion {
                LoadCompletion::Texture(ticket, _) | LoadCompletion::Environment(ticket, _) => {
                    ticket
                }
            };
            let ready = !respect_latency || load.remaining <= 0.0;
            if ready && predicate(ticket) {
                done.push(load.completion);
            } else {
                still_pending.push(load);
            }
        }
        self.pending = still_pending;
        done
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    pub fn requests(&self) -> &[LoadTicket] {
        &self.requests
    }

    pub fn path_of(&self, id: u64) -> Option<&str> {
        self.loaded_paths.get(&id).map(String::as_str)
    }

    pub fn light_intensity(&self, node: NodeHandle) -> Option<f32> {
        self.light_intensities.get(&node).copied()
    }

    pub fn emissive(&self, node: NodeHandle) -> Option<[f32; 3]> {
        self.emissive.get(&node).copied()
    }

    pub fn environment(&self) -> Option<EnvironmentHandle> {
        self.environment
    }

    pub fn environment_path(&self) -> Option<&str> {
        self.environment.and_then(|handle| self.path_of(handle.0))
    }

    pub fn background(&self) -> Option<Background> {
        self.background
    }

    pub fn material(&self, node: NodeHandle) -> Option<&MaterialHandle> {
        self.materials.get(&node)
    }

    pub fn material_uploads(&self) -> usize {
        self.material_uploads
    }

    pub fn camera(&self) -> Option<CameraPose> {
        self.camera
    }

    pub fn samples(&self) -> &[(String, f32)] {
        &self.samples
    }

    pub fn last_sample(&self, clip: &str) -> Option<f32> {
        self.samples
            .iter()
            .rev()
            .find(|(name, _)| name == clip)
            .map(|(_, time)| *time)
    }

    pub fn transform(&self, node: NodeHandle) -> Option<NodeTransform> {
        self.transforms.get(&node).copied()
    }

    pub fn restore_count(&self) -> usize {
        self.restore_count
    }
}

impl Renderer for HeadlessRenderer {
    fn request_texture(&mut self, ticket: LoadTicket) {
        let handle = TextureHandle(self.allocate(&ticket.path));
        self.requests.push(ticket.clone());
        self.pending.push(PendingLoad {
            completion: LoadCompletion::Texture(ticket, handle),
            remaining: self.latency_seconds,
        });
    }

    fn request_environment(&mut self, ticket: LoadTicket) {
        let handle = EnvironmentHandle(self.allocate(&ticket.path));
        self.requests.push(ticket.clone());
        self.pending.push(PendingLoad {
            completion: LoadCompletion::Environment(ticket, handle),
            remaining: self.latency_seconds,
        });
    }

    fn set_light_intensity(&mut self, node: NodeHandle, intensity: f32) {
        self.light_intensities.insert(node, intensity);
    }

    fn set_emissive(&mut self, node: NodeHandle, rgb: [f32; 3]) {
        self.emissive.insert(node, rgb);
    }

    fn set_environment(&mut self, environment: EnvironmentHandle) {
        self.environment = Some(environment);
    }

    fn set_background(&mut self, background: &Background) {
        self.background = Some(*background);
    }

    fn set_material(&mut self, node: NodeHandle, material: &MaterialHandle) {
        self.materials.insert(node, material.clone());
        self.material_uploads += 1;
    }

    fn set_camera(&mut self, pose: &CameraPose) {
        self.camera = Some(*pose);
    }

    fn sample_clip(&mut self, clip: &AnimationClip, local_time: f32) {
        self.samples.push((clip.name.clone(), local_time));
    }

    fn restore_transforms(&mut self, transforms: &[(NodeHandle, NodeTransform)]) {
        self.transforms.extend(transforms.iter().copied());
        self.restore_count += 1;
    }
}
