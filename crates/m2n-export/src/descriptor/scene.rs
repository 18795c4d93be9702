//! Scene descriptor: the node tree as nested Lua tables

use m2n_core::Transform;
use m2n_scene::{CameraLens, NodeId, NodeKind, SceneSource};

use super::lua::{quote, Table};
use crate::convert::{convert_camera_transform, convert_transform};
use crate::naming::{AssetName, Namespace};

/// Renders nodes of a scene source
pub struct SceneSerializer<'a, S: SceneSource + ?Sized> {
    source: &'a S,
    namespace: &'a Namespace,
}

impl<'a, S: SceneSource + ?Sized> SceneSerializer<'a, S> {
    pub fn new(source: &'a S, namespace: &'a Namespace) -> Self {
        Self { source, namespace }
    }

    /// Render the whole scene file
    ///
    /// Only parentless nodes become top-level entries; everything else is
    /// reached through its parent.
    pub fn scene(&self) -> String {
        let mut table = Table::new();
        for root in self.source.roots() {
            let Some(name) = self.source.node_name(root) else {
                continue;
            };
            if let Some(value) = self.node(root) {
                table.keyed(name, value);
            }
        }
        table.document()
    }

    /// Render one node and its subtree, `None` for kinds that are not exported
    pub fn node(&self, id: NodeId) -> Option<String> {
        let kind = self.source.node_kind(id)?;
        if !kind.is_exportable() {
            tracing::trace!(node = %id, kind = kind.label(), "Skipping unsupported node");
            return None;
        }
        let transform = self.source.node_transform(id).unwrap_or_default();

        match kind {
            NodeKind::Mesh { mesh } => Some(self.mesh(id, mesh, &transform)),
            NodeKind::Camera(lens) => Some(self.camera(id, lens, &transform)),
            NodeKind::Group => Some(self.group(id, &transform)),
            NodeKind::Other { .. } => None,
        }
    }

    fn mesh(&self, id: NodeId, mesh: &str, transform: &Transform) -> String {
        let reference = quote(&AssetName::model(self.namespace, mesh).to_string());
        let converted = convert_transform(transform);

        if converted.is_identity() && self.source.node_children(id).is_empty() {
            return reference;
        }

        let mut table = Table::new();
        table.push(reference);
        push_delta(&mut table, &converted);
        self.push_children(&mut table, id);
        table.render()
    }

    fn camera(&self, id: NodeId, lens: &CameraLens, transform: &Transform) -> String {
        let t = convert_camera_transform(transform);

        let mut table = Table::new();
        table.push(quote("camera"));
        table
            .number("tx", t.translation.x)
            .number("ty", t.translation.y)
            .number("tz", t.translation.z)
            .number("rx", t.rotation.x)
            .number("ry", t.rotation.y)
            .number("rz", t.rotation.z)
            .number("sx", t.scale.x)
            .number("sy", t.scale.y)
            .number("sz", t.scale.z)
            .number("fov", lens.fov.to_degrees())
            .number("near", lens.clip_start)
            .number("far", lens.clip_end);
        self.push_children(&mut table, id);
        table.render()
    }

    fn group(&self, id: NodeId, transform: &Transform) -> String {
        let mut table = Table::new();
        table.push(quote("group"));
        push_delta(&mut table, &convert_transform(transform));
        self.push_children(&mut table, id);
        table.render()
    }

    fn push_children(&self, table: &mut Table, id: NodeId) {
        for &child in self.source.node_children(id) {
            let Some(name) = self.source.node_name(child) else {
                continue;
            };
            if let Some(value) = self.node(child) {
                table.keyed(name, value);
            }
        }
    }
}

/// Append the fields of a target-space transform that differ from identity
fn push_delta(table: &mut Table, t: &Transform) {
    let fields = [
        ("tx", t.translation.x, 0.0),
        ("ty", t.translation.y, 0.0),
        ("tz", t.translation.z, 0.0),
        ("rx", t.rotation.x, 0.0),
        ("ry", t.rotation.y, 0.0),
        ("rz", t.rotation.z, 0.0),
        ("sx", t.scale.x, 1.0),
        ("sy", t.scale.y, 1.0),
        ("sz", t.scale.z, 1.0),
    ];

    for (ident, value, identity) in fields {
        if value != identity {
            table.number(ident, value);
        }
    }
}
