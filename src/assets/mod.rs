use crate::config::Settings;
use crate::error::{ConfiguratorError, Result};
use crate::materials::{MaterialHandle, SurfaceMaterial};
use crate::scene::{LoadedScene, NodeKind, NodeTransform, SceneBounds};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(u32);

impl ClipId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPolicy {
    PlayOnce,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration_seconds: f32,
    pub loop_policy: LoopPolicy,
    /// Hold the last pose once the clip runs out instead of snapping back.
    pub clamp_at_end: bool,
    pub targets: Vec<NodeHandle>,
}

/// Pristine local transforms of the support subtree, captured at load.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportSnapshot {
    pub root: NodeHandle,
    pub transforms: Vec<(NodeHandle, NodeTransform)>,
}

#[derive(Debug)]
struct RegisteredAsset {
    nodes: Vec<SceneNode>,
    node_lookup: HashMap<String, NodeHandle>,
    clips: Vec<AnimationClip>,
    clip_lookup: HashMap<String, ClipId>,
    node_materials: HashMap<NodeHandle, MaterialHandle>,
    support_snapshot: SupportSnapshot,
    support_bounds: SceneBounds,
}

/// Name → handle registry over the loaded lamp asset.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    asset: Option<RegisteredAsset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self { asset: None }
    }

    pub fn is_ready(&self) -> bool {
        self.asset.is_some()
    }

    /// Validates `scene` against the names `settings` requires and takes
    /// ownership of its nodes, clips and materials. Nothing is kept on failure.
    pub fn register_asset(&mut self, scene: &LoadedScene, settings: &Settings) -> Result<()> {
        if self.asset.is_some() {
            return Err(ConfiguratorError::AssetAlreadyLoaded);
        }

        let mut missing: Vec<String> = settings
            .required_nodes()
            .into_iter()
            .filter(|name| scene.node_index(name).is_none())
            .map(str::to_string)
            .collect();
        missing.extend(
            settings
                .required_clips()
                .into_iter()
                .filter(|name| !scene.clips.iter().any(|clip| clip.name == *name))
                .map(|name| format!("clip {name}")),
        );

        let support_index = scene.node_index(&settings.nodes.support);
        let support_bounds = support_index.and_then(|index| scene.subtree_bounds(index));
        if support_index.is_some() && support_bounds.is_none() {
            missing.push(format!("bounds under {}", settings.nodes.support));
        }
        let (Some(support_index), Some(support_bounds)) = (support_index, support_bounds) else {
            return Err(ConfiguratorError::AssetIncomplete { missing });
        };
        if !missing.is_empty() {
            return Err(ConfiguratorError::AssetIncomplete { missing });
        }

        let asset = build_asset(scene, support_index, support_bounds);
        log::info!(
            "Registered asset: {} nodes, {} clips, support bounds {:?}",
            asset.nodes.len(),
            asset.clips.len(),
            asset.support_bounds.size()
        );
        self.asset = Some(asset);
        Ok(())
    }

    /// Drops everything registered so far.
    pub fn teardown(&mut self) {
        if self.asset.take().is_some() {
            log::info!("Asset registry torn down");
        }
    }

    fn loaded(&self) -> Result<&RegisteredAsset> {
        self.asset.as_ref().ok_or(ConfiguratorError::AssetNotReady)
    }

    pub fn resolve(&self, name: &str) -> Result<NodeHandle> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.node_lookup.get(name).copied())
            .ok_or_else(|| ConfiguratorError::UnknownNode(name.to_string()))
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.nodes.get(handle.index()))
    }

    pub fn children(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let Some(asset) = &self.asset else {
            return Vec::new();
        };
        asset
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(handle))
            .map(|(index, _)| NodeHandle(index as u32))
            .collect()
    }

    pub fn resolve_clip(&self, name: &str) -> Result<ClipId> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.clip_lookup.get(name).copied())
            .ok_or_else(|| ConfiguratorError::UnknownClip(name.to_string()))
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.clips.get(id.index()))
    }

    pub fn clip_ids(&self) -> Result<Vec<ClipId>> {
        let asset = self.loaded()?;
        Ok((0..asset.clips.len()).map(|index| ClipId(index as u32)).collect())
    }

    /// Material the node carried when the asset was loaded.
    pub fn material_of(&self, handle: NodeHandle) -> Option<&MaterialHandle> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.node_materials.get(&handle))
    }

    pub fn support_snapshot(&self) -> Result<&SupportSnapshot> {
        Ok(&self.loaded()?.support_snapshot)
    }

    pub fn support_bounds(&self) -> Result<SceneBounds> {
        Ok(self.loaded()?.support_bounds)
    }
}

fn build_asset(
    scene: &LoadedScene,
    support_index: usize,
    support_bounds: SceneBounds,
) -> RegisteredAsset {
    let nodes: Vec<SceneNode> = scene
        .nodes
        .iter()
        .map(|node| SceneNode {
            name: node.name.clone(),
            kind: node.kind,
            parent: node
                .parent
                .filter(|parent| *parent < scene.nodes.len())
                .map(|parent| NodeHandle(parent as u32)),
        })
        .collect();

    let mut node_lookup = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        if node_lookup.contains_key(&node.name) {
            log::debug!("Duplicate node name '{}' ignored at index {}", node.name, index);
            continue;
        }
        node_lookup.insert(node.name.clone(), NodeHandle(index as u32));
    }

    let materials: Vec<MaterialHandle> = scene
        .materials
        .iter()
        .map(|material| {
            MaterialHandle::new(SurfaceMaterial {
                name: material.name.clone(),
                base_color: material.base_color,
                base_color_map: None,
                double_sided: material.double_sided,
            })
        })
        .collect();
    let mut node_materials = HashMap::new();
    for (index, node) in scene.nodes.iter().enumerate() {
        let Some(material_index) = node.material else {
            continue;
        };
        match materials.get(material_index) {
            Some(material) => {
                node_materials.insert(NodeHandle(index as u32), material.clone());
            }
            None => log::warn!(
                "Node '{}' references missing material {}",
                node.name,
                material_index
            ),
        }
    }

    let mut clips = Vec::with_capacity(scene.clips.len());
    let mut clip_lookup = HashMap::new();
    for clip in &scene.clips {
        if clip_lookup.contains_key(&clip.name) {
            log::debug!("Duplicate clip name '{}' ignored", clip.name);
            continue;
        }
        let targets = clip
            .targets
            .iter()
            .filter_map(|target| {
                let handle = node_lookup.get(target).copied();
                if handle.is_none() {
                    log::warn!("Clip '{}' targets unknown node '{}'", clip.name, target);
                }
                handle
            })
            .collect();
        clip_lookup.insert(clip.name.clone(), ClipId(clips.len() as u32));
        clips.push(AnimationClip {
            name: clip.name.clone(),
            duration_seconds: clip.duration_seconds.max(0.0),
            loop_policy: LoopPolicy::PlayOnce,
            clamp_at_end: true,
            targets,
        });
    }

    let support_snapshot = SupportSnapshot {
        root: NodeHandle(support_index as u32),
        transforms: scene
            .subtree(support_index)
            .into_iter()
            .map(|index| (NodeHandle(index as u32), scene.nodes[index].transform))
            .collect(),
    };

    RegisteredAsset {
        nodes,
        node_lookup,
        clips,
        clip_lookup,
        node_materials,
        support_snapshot,
        support_bounds,
    }
}
