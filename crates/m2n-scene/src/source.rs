//! Read-only capability interface over a host scene
//!
//! The export pipeline only talks to a scene through [`SceneSource`], so it
//! is independent of any particular host object model. Implementors must
//! return nodes in a stable order; every output file depends on it.

use m2n_core::Transform;

use crate::material::{Image, Material};
use crate::mesh::MeshData;
use crate::node::{NodeId, NodeKind};

/// Read-only view of a scene to export
pub trait SceneSource {
    /// Scene name, used for the scene descriptor file
    fn scene_name(&self) -> &str;

    /// All nodes, in scene order
    fn node_ids(&self) -> Vec<NodeId>;

    /// Node name, `None` for an unknown handle
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Node kind
    fn node_kind(&self, id: NodeId) -> Option<&NodeKind>;

    /// Local transform in source space
    fn node_transform(&self, id: NodeId) -> Option<Transform>;

    /// Parent handle, `None` for roots and unknown handles
    fn node_parent(&self, id: NodeId) -> Option<NodeId>;

    /// Children in order
    fn node_children(&self, id: NodeId) -> &[NodeId];

    /// Per-object material slots of a node
    fn material_slots(&self, id: NodeId) -> &[Option<String>];

    /// Mesh data by name
    fn mesh(&self, name: &str) -> Option<&MeshData>;

    /// All materials
    fn materials(&self) -> &[Material];

    /// All images
    fn images(&self) -> &[Image];

    /// Number of nodes
    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    /// Nodes without a parent, in scene order
    fn roots(&self) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|&id| self.node_parent(id).is_none())
            .collect()
    }

    /// Mesh nodes in scene order, paired with their mesh-data name
    fn mesh_nodes(&self) -> Vec<(NodeId, &str)> {
        self.node_ids()
            .into_iter()
            .filter_map(|id| self.node_kind(id)?.mesh_name().map(|mesh| (id, mesh)))
            .collect()
    }

    /// Look up an image by name
    fn image(&self, name: &str) -> Option<&Image> {
        self.images().iter().find(|image| image.name == name)
    }
}
