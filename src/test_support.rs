use crate::scene::{
    ClipDescriptor, LoadedScene, MaterialDescriptor, NodeDescriptor, NodeKind, NodeTransform,
    SceneBounds,
};
use glam::{Quat, Vec3};

fn node(name: &str, kind: NodeKind, parent: Option<usize>, material: Option<usize>) -> NodeDescriptor {
    NodeDescriptor {
        name: name.to_string(),
        kind,
        parent,
        transform: NodeTransform::default(),
        bounds: None,
        material,
    }
}

/// Articulated lamp with the stage lights around it. The support subtree
/// spans 10 x 4 x 6 units centred on (0, 2, 0).
pub fn lamp_scene() -> LoadedScene {
    let fabric = Some(0);
    let metal = Some(1);
    let glass = Some(2);
    let mut nodes = vec![
        node("Support", NodeKind::Mesh, None, metal),
        node("SupportJointHolder", NodeKind::Mesh, Some(0), metal),
        node("SupportJoint", NodeKind::Mesh, Some(1), metal),
        node("CircleJoint", NodeKind::Mesh, Some(2), metal),
        node("LongArmPivot", NodeKind::Joint, Some(3), None),
        node("LongArm", NodeKind::Mesh, Some(4), metal),
        node("ShortArm", NodeKind::Mesh, Some(5), metal),
        node("ArmToAbajurJoint", NodeKind::Mesh, Some(6), metal),
        node("AbajurJoint", NodeKind::Mesh, Some(7), metal),
        node("AbajurMesh", NodeKind::Mesh, Some(8), fabric),
        node("S_LightBulb", NodeKind::Joint, Some(9), None),
        node("S_LightBulb_Glass", NodeKind::Mesh, Some(10), glass),
        node("Point", NodeKind::Light, Some(10), None),
        node("Spot", NodeKind::Light, Some(10), None),
        node("DirectionalLight", NodeKind::Light, None, None),
        node("PanelLight1", NodeKind::Light, None, None),
        node("PanelLight2", NodeKind::Light, None, None),
    ];
    nodes[0].bounds = Some(SceneBounds::new(
        Vec3::new(-5.0, 0.0, -3.0),
        Vec3::new(5.0, 4.0, 3.0),
    ));
    nodes[9].bounds = Some(SceneBounds::new(
        Vec3::new(-1.0, 2.0, -1.0),
        Vec3::new(1.0, 3.5, 1.0),
    ));
    nodes[5].transform = NodeTransform {
        translation: Vec3::new(0.0, 1.0, 0.0),
        rotation: Quat::from_rotation_z(0.4),
        scale: Vec3::ONE,
    };
    nodes[14].transform.translation = Vec3::new(5.0, 10.0, 8.0);

    let materials = vec![
        MaterialDescriptor {
            name: "AbajurFabric".to_string(),
            base_color: [0.8, 0.78, 0.74, 1.0],
            double_sided: true,
        },
        MaterialDescriptor {
            name: "BrushedMetal".to_string(),
            base_color: [0.5, 0.5, 0.52, 1.0],
            double_sided: false,
        },
        MaterialDescriptor {
            name: "BulbGlass".to_string(),
            base_color: [1.0, 1.0, 1.0, 0.4],
            double_sided: false,
        },
    ];

    let clip = |name: &str, duration_seconds: f32, target: &str| ClipDescriptor {
        name: name.to_string(),
        duration_seconds,
        targets: vec![target.to_string()],
    };
    let clips = vec![
        clip("SuporteAnimacao", 2.0, "SupportJoint"),
        clip("BracoLongoAnimacao", 1.5, "LongArm"),
        clip("BracoCurtoAnimacao", 1.5, "ShortArm"),
        clip("EncaixeBracoCurtoAnimacao", 1.0, "ArmToAbajurJoint"),
        clip("AbajurAnimacao", 2.5, "AbajurJoint"),
    ];

    LoadedScene {
        nodes,
        materials,
        clips,
    }
}
