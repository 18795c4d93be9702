//! JSON scene documents
//!
//! A [`SceneDocument`] is the on-disk form of a scene; [`Scene`] is the
//! resolved, validated form that implements [`SceneSource`].

use std::collections::{HashMap, HashSet};
use std::path::Path;

use m2n_core::{check_asset_name, Error, Result, ResultExt, Transform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::material::{Image, Material};
use crate::mesh::MeshData;
use crate::node::{CameraLens, NodeId, NodeKind, SceneNode};
use crate::source::SceneSource;

/// Serialized scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub meshes: Vec<MeshData>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Serialized node; parent links are by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub material_slots: Vec<Option<String>>,
}

impl NodeRecord {
    /// Mesh node instancing `mesh`
    pub fn mesh(name: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Mesh { mesh: mesh.into() })
    }

    /// Camera node
    pub fn camera(name: impl Into<String>, lens: CameraLens) -> Self {
        Self::new(name, NodeKind::Camera(lens))
    }

    /// Empty group node
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            transform: Transform::IDENTITY,
            material_slots: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.material_slots = slots.into_iter().map(|s| s.map(Into::into)).collect();
        self
    }
}

impl SceneDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a document from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene document {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing scene document {}", path.display()))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve parent links and validate the document
    ///
    /// Scene, mesh, material and image names become file names, so each
    /// must be a single path component and unique within its kind. Every
    /// material slot and texture image must name something the document
    /// defines.
    pub fn into_scene(self) -> Result<Scene> {
        check_asset_name(&self.name).context("scene name")?;

        let images = unique_names("image", self.images.iter().map(|i| i.name.as_str()))?;
        let materials = unique_names("material", self.materials.iter().map(|m| m.name.as_str()))?;

        for material in &self.materials {
            for image in material.texture_slots.iter().filter_map(|slot| slot.image.as_deref()) {
                if !images.contains(image) {
                    return Err(Error::UnresolvedReference {
                        kind: "image".into(),
                        name: image.to_string(),
                    }
                    .with_context(format!("material '{}'", material.name)));
                }
            }
        }

        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, record) in self.nodes.iter().enumerate() {
            if index.insert(record.name.clone(), NodeId(i)).is_some() {
                return Err(Error::invalid_data(format!("duplicate node name '{}'", record.name)));
            }
        }

        let mut mesh_index = HashMap::with_capacity(self.meshes.len());
        for (i, mesh) in self.meshes.iter().enumerate() {
            check_asset_name(&mesh.name).context("mesh name")?;
            mesh.validate().map_err(Error::invalid_data)?;
            if mesh_index.insert(mesh.name.clone(), i).is_some() {
                return Err(Error::invalid_data(format!("duplicate mesh name '{}'", mesh.name)));
            }
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for record in self.nodes {
            let parent = match &record.parent {
                Some(parent) => Some(*index.get(parent).ok_or_else(|| {
                    Error::invalid_data(format!(
                        "node '{}' has unknown parent '{}'",
                        record.name, parent
                    ))
                })?),
                None => None,
            };

            if let Some(mesh) = record.kind.mesh_name() {
                if !mesh_index.contains_key(mesh) {
                    return Err(Error::MissingMesh { name: mesh.to_string() });
                }
            }

            for material in record.material_slots.iter().flatten() {
                if !materials.contains(material.as_str()) {
                    return Err(Error::UnresolvedReference {
                        kind: "material".into(),
                        name: material.clone(),
                    }
                    .with_context(format!("node '{}'", record.name)));
                }
            }

            nodes.push(SceneNode {
                name: record.name,
                kind: record.kind,
                transform: record.transform,
                parent,
                children: Vec::new(),
                material_slots: record.material_slots,
            });
        }

        for i in 0..nodes.len() {
            if let Some(parent) = nodes[i].parent {
                nodes[parent.index()].children.push(NodeId(i));
            }
        }

        check_acyclic(&nodes)?;

        debug!(
            scene = %self.name,
            nodes = nodes.len(),
            meshes = self.meshes.len(),
            materials = self.materials.len(),
            "Resolved scene document"
        );

        Ok(Scene {
            name: self.name,
            nodes,
            meshes: self.meshes,
            mesh_index,
            materials: self.materials,
            images: self.images,
        })
    }
}

/// Check asset names of one kind and collect them
fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for name in names {
        check_asset_name(name).with_context(|| format!("{} name", kind))?;
        if !seen.insert(name) {
            return Err(Error::invalid_data(format!("duplicate {} name '{}'", kind, name)));
        }
    }
    Ok(seen)
}

/// Walk every parent chain; a chain longer than the node count is a cycle
fn check_acyclic(nodes: &[SceneNode]) -> Result<()> {
    for (i, node) in nodes.iter().enumerate() {
        let mut current = node.parent;
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if steps > nodes.len() {
                return Err(Error::invalid_data(format!(
                    "node '{}' is part of a parent cycle",
                    nodes[i].name
                )));
            }
            current = nodes[parent.index()].parent;
        }
    }
    Ok(())
}

/// A resolved, validated scene
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    nodes: Vec<SceneNode>,
    meshes: Vec<MeshData>,
    mesh_index: HashMap<String, usize>,
    materials: Vec<Material>,
    images: Vec<Image>,
}

impl Scene {
    /// Load and resolve a JSON scene document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        SceneDocument::load(path)?.into_scene()
    }

    /// Parse and resolve JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        SceneDocument::from_json(text)?.into_scene()
    }

    /// Resolved node by handle
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    /// Find a node handle by name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// All mesh data
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }
}

impl SceneSource for Scene {
    fn scene_name(&self) -> &str {
        &self.name
    }

    fn node_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).map(NodeId).collect()
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    fn node_kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    fn node_transform(&self, id: NodeId) -> Option<Transform> {
        self.get(id).map(|n| n.transform)
    }

    fn node_parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    fn node_children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn material_slots(&self, id: NodeId) -> &[Option<String>] {
        self.get(id).map(|n| n.material_slots.as_slice()).unwrap_or(&[])
    }

    fn mesh(&self, name: &str) -> Option<&MeshData> {
        self.mesh_index.get(name).map(|&i| &self.meshes[i])
    }

    fn materials(&self) -> &[Material] {
        &self.materials
    }

    fn images(&self) -> &[Image] {
        &self.images
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{TextureSlot, TextureType};

    fn document() -> SceneDocument {
        let mut doc = SceneDocument::new("Level");
        doc.meshes.push(MeshData::new("CubeData"));
        doc.nodes.push(NodeRecord::mesh("Cube", "CubeData"));
        doc.nodes.push(NodeRecord::group("Pivot"));
        doc.nodes.push(NodeRecord::mesh("Child", "CubeData").with_parent("Pivot"));
        doc
    }

    #[test]
    fn test_children_follow_parent_links() {
        let scene = document().into_scene().unwrap();
        let pivot = scene.find("Pivot").unwrap();
        let child = scene.find("Child").unwrap();

        assert_eq!(scene.node_children(pivot), &[child]);
        assert_eq!(scene.node_parent(child), Some(pivot));
        assert_eq!(scene.roots().len(), 2);
    }

    #[test]
    fn test_duplicate_node_names_rejected() {
        let mut doc = document();
        doc.nodes.push(NodeRecord::group("Cube"));
        assert!(doc.into_scene().unwrap_err().to_string().contains("duplicate node name"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut doc = document();
        doc.nodes.push(NodeRecord::group("Orphan").with_parent("Nobody"));
        assert!(doc.into_scene().is_err());
    }

    #[test]
    fn test_missing_mesh_rejected() {
        let mut doc = document();
        doc.nodes.push(NodeRecord::mesh("Ghost", "NoSuchData"));
        assert!(matches!(doc.into_scene(), Err(Error::MissingMesh { .. })));
    }

    #[test]
    fn test_unknown_material_slot_rejected() {
        let mut doc = document();
        doc.materials.push(Material::new("Hull"));
        doc.nodes[0].material_slots = vec![Some("Hull".into()), None, Some("Ghost".into())];

        let err = doc.into_scene().unwrap_err();
        assert!(err.to_string().contains("Unresolved material reference 'Ghost'"));
        assert!(err.to_string().contains("node 'Cube'"));
    }

    #[test]
    fn test_unknown_texture_image_rejected() {
        let mut doc = document();
        doc.images.push(Image {
            name: "hull.jpg".into(),
            source: Default::default(),
            filepath: None,
        });
        let mut material = Material::new("Hull");
        material.texture_slots = vec![
            TextureSlot { slot: 0, texture_type: TextureType::Image, image: Some("hull.jpg".into()) },
            TextureSlot { slot: 1, texture_type: TextureType::Image, image: Some("ghost.png".into()) },
        ];
        doc.materials.push(material);

        let err = doc.into_scene().unwrap_err();
        assert!(err.to_string().contains("Unresolved image reference 'ghost.png'"));
        assert!(err.to_string().contains("material 'Hull'"));
    }

    #[test]
    fn test_path_like_names_rejected() {
        let mut doc = document();
        doc.meshes.push(MeshData::new("../../escaped"));
        assert!(doc.into_scene().unwrap_err().to_string().contains("mesh name"));

        let mut doc = document();
        doc.name = "..".into();
        assert!(doc.into_scene().is_err());

        let mut doc = document();
        doc.materials.push(Material::new("a/b"));
        assert!(doc.into_scene().is_err());

        let mut doc = document();
        doc.images.push(Image {
            name: "c:\\hull.jpg".into(),
            source: Default::default(),
            filepath: None,
        });
        assert!(doc.into_scene().is_err());
    }

    #[test]
    fn test_duplicate_material_names_rejected() {
        let mut doc = document();
        doc.materials.push(Material::new("Hull"));
        doc.materials.push(Material::new("Hull"));
        assert!(doc.into_scene().unwrap_err().to_string().contains("duplicate material name"));
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut doc = SceneDocument::new("Loop");
        doc.nodes.push(NodeRecord::group("A").with_parent("B"));
        doc.nodes.push(NodeRecord::group("B").with_parent("A"));
        assert!(doc.into_scene().unwrap_err().to_string().contains("cycle"));
    }

    #[test]
    fn test_mesh_nodes_in_scene_order() {
        let scene = document().into_scene().unwrap();
        let names: Vec<_> = scene.mesh_nodes().into_iter().map(|(_, mesh)| mesh).collect();
        assert_eq!(names, vec!["CubeData", "CubeData"]);
    }
}
