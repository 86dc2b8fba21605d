//! Description of a loaded scene as handed over by the loader once the lamp
//! asset (plus the stage lights around it) is in memory.

pub mod serialization;

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Joint,
    Mesh,
    Light,
}

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Axis-aligned bounds in world space.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SceneBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn union(&self, other: &SceneBounds) -> SceneBounds {
        SceneBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub kind: NodeKind,
    /// Index of the parent in `LoadedScene::nodes`.
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub transform: NodeTransform,
    #[serde(default)]
    pub bounds: Option<SceneBounds>,
    /// Index into `LoadedScene::materials`.
    #[serde(default)]
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialDescriptor {
    pub name: String,
    #[serde(default = "default_base_color")]
    pub base_color: [f32; 4],
    #[serde(default)]
    pub double_sided: bool,
}

fn default_base_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipDescriptor {
    pub name: String,
    pub duration_seconds: f32,
    /// Names of the nodes the clip animates.
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoadedScene {
    pub nodes: Vec<NodeDescriptor>,
    #[serde(default)]
    pub materials: Vec<MaterialDescriptor>,
    #[serde(default)]
    pub clips: Vec<ClipDescriptor>,
}

impl LoadedScene {
    /// First node carrying `name`, in declaration order.
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(index))
            .map(|(child, _)| child)
    }

    /// `root` followed by all of its descendants, depth first.
    pub fn subtree(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if index >= self.nodes.len() || out.contains(&index) {
                continue;
            }
            out.push(index);
            let mut children: Vec<usize> = self.children(index).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn subtree_bounds(&self, root: usize) -> Option<SceneBounds> {
        self.subtree(root)
            .into_iter()
            .filter_map(|index| self.nodes[index].bounds)
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadedScene, SceneBounds};
    use crate::test_support::lamp_scene;
    use glam::Vec3;

    #[test]
    fn subtree_is_depth_first_from_root() {
        let scene = lamp_scene();
        let support = scene.node_index("Support").unwrap();
        let subtree = scene.subtree(support);
        assert_eq!(subtree[0], support);
        let names: Vec<&str> = subtree
            .iter()
            .map(|index| scene.nodes[*index].name.as_str())
            .collect();
        assert!(names.contains(&"AbajurMesh"));
        assert!(names.contains(&"Point"));
        assert!(!names.contains(&"DirectionalLight"));
        let long_arm = names.iter().position(|name| *name == "LongArm").unwrap();
        let short_arm = names.iter().position(|name| *name == "ShortArm").unwrap();
        assert!(long_arm < short_arm);
    }

    #[test]
    fn subtree_bounds_unions_descendants() {
        let scene = lamp_scene();
        let support = scene.node_index("Support").unwrap();
        let bounds = scene.subtree_bounds(support).unwrap();
        assert_eq!(bounds.size(), Vec3::new(10.0, 4.0, 6.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn bounds_normalise_inverted_corners() {
        let bounds = SceneBounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(bounds.max_dimension(), 2.0);
    }

    #[test]
    fn subtree_tolerates_parent_cycles() {
        let mut scene = lamp_scene();
        let support = scene.node_index("Support").unwrap();
        let holder = scene.node_index("SupportJointHolder").unwrap();
        scene.nodes[support].parent = Some(holder);
        let subtree = scene.subtree(support);
        let mut deduped = subtree.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(subtree.len(), deduped.len());
        assert!(LoadedScene::default().subtree(0).is_empty());
    }
}
