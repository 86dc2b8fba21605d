//! JSON files the configurator reads: lamp manifests, settings and scripts.

use crate::scene::LoadedScene;
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Reads any JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub fn save_scene_to_file(scene: &LoadedScene, path: &Path) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(scene)?)?;
    Ok(())
}

/// Reads a lamp manifest and checks that every parent and material index
/// points inside the manifest.
pub fn load_scene_from_file(path: &Path) -> Result<LoadedScene> {
    let scene: LoadedScene = read_json(path)?;
    validate_indices(&scene)?;
    Ok(scene)
}

fn validate_indices(scene: &LoadedScene) -> Result<()> {
    for (index, node) in scene.nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            if parent >= scene.nodes.len() || parent == index {
                return Err(SerializationError::Manifest(format!(
                    "node '{}' has invalid parent {parent}",
                    node.name
                )));
            }
        }
        if let Some(material) = node.material {
            if material >= scene.materials.len() {
                return Err(SerializationError::Manifest(format!(
                    "node '{}' uses missing material {material}",
                    node.name
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::scene::{LoadedScene, NodeKind, NodeTransform};
    use crate::test_support::lamp_scene;
    use glam::Vec3;

    #[test]
    fn test_minimal_manifest_uses_defaults() {
        let json = r#"{
            "nodes": [
                { "name": "Support", "kind": "Mesh" },
                { "name": "Point", "kind": "Light", "parent": 0 }
            ]
        }"#;
        let scene: LoadedScene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.nodes[0].transform, NodeTransform::default());
        assert_eq!(scene.nodes[1].kind, NodeKind::Light);
        assert_eq!(scene.nodes[1].parent, Some(0));
        assert!(scene.materials.is_empty());
        assert!(scene.clips.is_empty());
    }

    #[test]
    fn test_vectors_serialize_as_arrays() {
        let scene = lamp_scene();
        let json = serde_json::to_string(&scene).unwrap();
        assert!(json.contains("\"translation\":["));
        assert!(!json.contains("\"x\""));
    }

    #[test]
    fn test_save_load_via_file() {
        let scene = lamp_scene();

        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "lamp_configurator_scene_{}_{}.json",
            std::process::id(),
            nonce
        ));

        super::save_scene_to_file(&scene, &path).unwrap();
        let loaded = super::load_scene_from_file(&path).unwrap();
        assert_eq!(loaded.nodes.len(), scene.nodes.len());
        assert_eq!(loaded.clips.len(), 5);
        let support = loaded.node_index("Support").unwrap();
        assert_eq!(
            loaded.subtree_bounds(support).unwrap().size(),
            Vec3::new(10.0, 4.0, 6.0)
        );

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_dangling_indices_are_rejected() {
        let mut scene = lamp_scene();
        scene.nodes[3].parent = Some(99);
        assert!(matches!(
            super::validate_indices(&scene),
            Err(super::SerializationError::Manifest(_))
        ));

        let mut scene = lamp_scene();
        scene.nodes[5].material = Some(3);
        assert!(matches!(
            super::validate_indices(&scene),
            Err(super::SerializationError::Manifest(_))
        ));
        assert!(super::validate_indices(&lamp_scene()).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("lamp_configurator_does_not_exist.json");
        let result = super::load_scene_from_file(&path);
        assert!(matches!(result, Err(super::SerializationError::Io(_))));
    }
}
