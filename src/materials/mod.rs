use crate::assets::{AssetRegistry, NodeHandle};
use crate::config::Settings;
use crate::error::{ConfiguratorError, Result};
use crate::render::{Renderer, TextureHandle};
use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_map: Option<TextureHandle>,
    pub double_sided: bool,
}

/// Shared reference to a material. Equality is identity: two handles are
/// equal only when they point at the same material instance.
#[derive(Debug, Clone)]
pub struct MaterialHandle(Rc<SurfaceMaterial>);

impl MaterialHandle {
    pub fn new(material: SurfaceMaterial) -> Self {
        Self(Rc::new(material))
    }

    pub fn ptr_eq(&self, other: &MaterialHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for MaterialHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for MaterialHandle {}

impl Deref for MaterialHandle {
    type Target = SurfaceMaterial;

    fn deref(&self) -> &SurfaceMaterial {
        &self.0
    }
}

#[derive(Debug)]
struct Surfaces {
    shade: NodeHandle,
    supports: Vec<NodeHandle>,
    swappable: HashMap<String, NodeHandle>,
}

/// Tracks which material every swappable surface and support node shows.
#[derive(Debug, Default)]
pub struct MaterialController {
    surfaces: Option<Surfaces>,
    defaults: HashMap<NodeHandle, MaterialHandle>,
    current: HashMap<NodeHandle, MaterialHandle>,
    dirty: BTreeSet<NodeHandle>,
    epoch: u64,
}

impl MaterialController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the load-time material of every tracked node.
    pub fn attach(&mut self, registry: &AssetRegistry, settings: &Settings) -> Result<()> {
        let shade = registry.resolve(&settings.nodes.shade)?;
        let supports = settings
            .support_nodes
            .iter()
            .map(|name| registry.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        let mut swappable = HashMap::new();
        for name in &settings.swappable_surfaces {
            let handle = registry.resolve(name)?;
            if registry.material_of(handle).is_none() {
                return Err(ConfiguratorError::UnknownSurface(name.clone()));
            }
            swappable.insert(name.clone(), handle);
        }
        if registry.material_of(shade).is_none() {
            return Err(ConfiguratorError::UnknownSurface(settings.nodes.shade.clone()));
        }

        let mut defaults = HashMap::new();
        for handle in swappable.values().chain(&supports).chain([&shade]) {
            if let Some(material) = registry.material_of(*handle) {
                defaults.insert(*handle, material.clone());
            }
        }

        self.current = defaults.clone();
        self.defaults = defaults;
        self.dirty.clear();
        self.surfaces = Some(Surfaces {
            shade,
            supports,
            swappable,
        });
        Ok(())
    }

    pub fn detach(&mut self) {
        self.surfaces = None;
        self.defaults.clear();
        self.current.clear();
        self.dirty.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn surfaces(&self) -> Result<&Surfaces> {
        self.surfaces.as_ref().ok_or(ConfiguratorError::AssetNotReady)
    }

    /// Node behind a swappable surface name.
    pub fn surface_handle(&self, surface: &str) -> Result<NodeHandle> {
        self.surfaces()?
            .swappable
            .get(surface)
            .copied()
            .ok_or_else(|| ConfiguratorError::UnknownSurface(surface.to_string()))
    }

    /// Epoch that pending swatch loads are checked against.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Invalidates every swatch load issued so far.
    pub fn begin_request(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    /// Puts a fresh double-sided material mapping `texture` on `surface`.
    pub fn apply_swatch(&mut self, surface: &str, texture: TextureHandle) -> Result<MaterialHandle> {
        let handle = self.surface_handle(surface)?;
        let material = MaterialHandle::new(SurfaceMaterial {
            name: format!("{surface} swatch"),
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_map: Some(texture),
            double_sided: true,
        });
        self.assign(handle, material.clone());
        log::debug!("Swatch texture {:?} applied to {}", texture, surface);
        Ok(material)
    }

    /// Puts back the exact material instance `surface` had at load.
    pub fn reset_to_default(&mut self, surface: &str) -> Result<()> {
        let handle = self.surface_handle(surface)?;
        let default = self
            .defaults
            .get(&handle)
            .cloned()
            .ok_or_else(|| ConfiguratorError::UnknownSurface(surface.to_string()))?;
        self.assign(handle, default);
        Ok(())
    }

    /// Makes every support node share the shade's current material.
    pub fn propagate_to_supports(&mut self) -> Result<()> {
        let surfaces = self.surfaces()?;
        let shade = surfaces.shade;
        let supports = surfaces.supports.clone();
        let material = self
            .current
            .get(&shade)
            .cloned()
            .ok_or(ConfiguratorError::AssetNotReady)?;
        for support in supports {
            self.assign(support, material.clone());
        }
        Ok(())
    }

    fn assign(&mut self, node: NodeHandle, material: MaterialHandle) {
        self.current.insert(node, material);
        self.dirty.insert(node);
    }

    pub fn current(&self, node: NodeHandle) -> Option<&MaterialHandle> {
        self.current.get(&node)
    }

    pub fn default_of(&self, node: NodeHandle) -> Option<&MaterialHandle> {
        self.defaults.get(&node)
    }

    pub fn shade(&self) -> Option<NodeHandle> {
        self.surfaces.as_ref().map(|surfaces| surfaces.shade)
    }

    pub fn has_pending_uploads(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Pushes every changed assignment to the renderer.
    pub fn flush(&mut self, renderer: &mut dyn Renderer) {
        for node in std::mem::take(&mut self.dirty) {
            if let Some(material) = self.current.get(&node) {
                renderer.set_material(node, material);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MaterialController;
    use crate::assets::AssetRegistry;
    use crate::config::Settings;
    use crate::error::ConfiguratorError;
    use crate::render::{HeadlessRenderer, TextureHandle};
    use crate::test_support::lamp_scene;

    fn attached() -> (AssetRegistry, MaterialController) {
        let settings = Settings::default();
        let mut registry = AssetRegistry::new();
        registry.register_asset(&lamp_scene(), &settings).unwrap();
        let mut materials = MaterialController::new();
        materials.attach(&registry, &settings).unwrap();
        (registry, materials)
    }

    #[test]
    fn swatch_then_reset_restores_identical_default() {
        let (registry, mut materials) = attached();
        let shade = registry.resolve("AbajurMesh").unwrap();
        let before = materials.current(shade).unwrap().clone();

        let swatch = materials.apply_swatch("AbajurMesh", TextureHandle(7)).unwrap();
        assert!(!swatch.ptr_eq(&before));
        assert_eq!(swatch.base_color_map, Some(TextureHandle(7)));
        assert!(swatch.double_sided);

        materials.reset_to_default("AbajurMesh").unwrap();
        assert!(materials.current(shade).unwrap().ptr_eq(&before));
        assert!(materials.default_of(shade).unwrap().ptr_eq(&before));
        assert!(before.ptr_eq(registry.material_of(shade).unwrap()));
    }

    #[test]
    fn unknown_surface_is_rejected_without_changes() {
        let (registry, mut materials) = attached();
        let long_arm = registry.resolve("LongArm").unwrap();
        let before = materials.current(long_arm).unwrap().clone();
        assert_eq!(
            materials.apply_swatch("LongArm", TextureHandle(1)).unwrap_err(),
            ConfiguratorError::UnknownSurface("LongArm".to_string())
        );
        assert_eq!(
            materials.reset_to_default("Lampshade").unwrap_err(),
            ConfiguratorError::UnknownSurface("Lampshade".to_string())
        );
        assert!(materials.current(long_arm).unwrap().ptr_eq(&before));
    }

    #[test]
    fn propagation_is_idempotent_and_resyncs() {
        let (registry, mut materials) = attached();
        let shade = registry.resolve("AbajurMesh").unwrap();
        let long_arm = registry.resolve("LongArm").unwrap();
        let support = registry.resolve("Support").unwrap();

        materials.propagate_to_supports().unwrap();
        materials.propagate_to_supports().unwrap();
        let shade_material = materials.current(shade).unwrap().clone();
        assert!(materials.current(long_arm).unwrap().ptr_eq(&shade_material));
        assert!(materials.current(support).unwrap().ptr_eq(&shade_material));

        let swatch = materials.apply_swatch("AbajurMesh", TextureHandle(3)).unwrap();
        assert!(materials.current(long_arm).unwrap().ptr_eq(&shade_material));
        materials.propagate_to_supports().unwrap();
        assert!(materials.current(long_arm).unwrap().ptr_eq(&swatch));
    }

    #[test]
    fn flush_uploads_each_dirty_node_once() {
        let (registry, mut materials) = attached();
        let mut renderer = HeadlessRenderer::new(0.0);
        materials.propagate_to_supports().unwrap();
        materials.propagate_to_supports().unwrap();
        assert!(materials.has_pending_uploads());
        materials.flush(&mut renderer);
        assert!(!materials.has_pending_uploads());
        assert_eq!(renderer.material_uploads(), Settings::default().support_nodes.len());
        let shade = registry.resolve("AbajurMesh").unwrap();
        assert!(renderer
            .material(shade)
            .unwrap()
            .ptr_eq(materials.current(shade).unwrap()));
        materials.flush(&mut renderer);
        assert_eq!(renderer.material_uploads(), Settings::default().support_nodes.len());
    }

    #[test]
    fn detached_controller_reports_not_ready() {
        let mut materials = MaterialController::new();
        assert_eq!(
            materials.propagate_to_supports(),
            Err(ConfiguratorError::AssetNotReady)
        );
        assert_eq!(
            materials.apply_swatch("AbajurMesh", TextureHandle(1)).unwrap_err(),
            ConfiguratorError::AssetNotReady
        );
    }

    #[test]
    fn begin_request_advances_epoch() {
        let (_registry, mut materials) = attached();
        let first = materials.begin_request();
        let second = materials.begin_request();
        assert!(second > first);
        assert_eq!(materials.epoch(), second);
    }
}
