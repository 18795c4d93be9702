//! Scene node structures

use m2n_core::Transform;
use serde::{Deserialize, Serialize};

/// Handle to a node inside one scene source
///
/// Handles are only meaningful for the source that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Get the raw index value
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Camera lens parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraLens {
    /// Field of view in radians
    pub fov: f32,
    /// Near clip distance
    pub clip_start: f32,
    /// Far clip distance
    pub clip_end: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            // 50mm lens on a 36mm sensor
            fov: 0.691_150_4,
            clip_start: 0.1,
            clip_end: 100.0,
        }
    }
}

/// What a node represents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// Instance of a mesh, keyed by mesh-data name
    Mesh { mesh: String },
    /// Perspective camera
    Camera(CameraLens),
    /// Empty transform node
    Group,
    /// Any host object type the exporter does not handle
    Other { host_type: String },
}

impl NodeKind {
    /// Check if the exporter knows how to serialize this kind
    pub fn is_exportable(&self) -> bool {
        !matches!(self, NodeKind::Other { .. })
    }

    /// Mesh-data name for mesh nodes
    pub fn mesh_name(&self) -> Option<&str> {
        match self {
            NodeKind::Mesh { mesh } => Some(mesh),
            _ => None,
        }
    }

    /// Short label for logging
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Mesh { .. } => "mesh",
            NodeKind::Camera(_) => "camera",
            NodeKind::Group => "group",
            NodeKind::Other { host_type } => host_type,
        }
    }
}

/// A resolved scene node
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Node name, unique within the scene
    pub name: String,
    pub kind: NodeKind,
    /// Local transform in source space
    pub transform: Transform,
    /// Parent handle, `None` for scene roots
    pub parent: Option<NodeId>,
    /// Child handles in document order
    pub children: Vec<NodeId>,
    /// Per-object material slots, indexed by polygon material index
    pub material_slots: Vec<Option<String>>,
}

impl SceneNode {
    /// Check if this node is a scene root
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
