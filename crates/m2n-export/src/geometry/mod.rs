//! Material-grouped geometry
//!
//! A [`Model`] holds one mesh's vertices split by material. Group order is
//! first-seen order during face traversal and is carried unchanged into the
//! model descriptor and, for the merged layout, into the vertex buffer.

pub mod codec;
pub mod extract;

use std::collections::HashMap;

use m2n_core::Vertex;
use serde::{Deserialize, Serialize};

pub use codec::{decode, detect_format, DecodedGeometry, GeometryEncoder, GeometryFormat, VertexAttributes};
pub use extract::extract_model;

/// Key used for faces without a material
pub const NO_MATERIAL_KEY: &str = "none";

/// How a model's material groups map onto geometry files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryLayout {
    /// One file per model; groups are sliced by start/count
    #[default]
    Merged,
    /// One file per (model, material)
    Split,
}

impl std::str::FromStr for GeometryLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merged" => Ok(GeometryLayout::Merged),
            "split" => Ok(GeometryLayout::Split),
            _ => Err(format!("Unknown geometry layout: {}", s)),
        }
    }
}

/// Vertices of one mesh assigned to one material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup {
    /// Material name, `None` for faces without one
    pub material: Option<String>,
    pub vertices: Vec<Vertex>,
}

impl MaterialGroup {
    /// Descriptor key and geometry-name suffix
    pub fn key(&self) -> &str {
        self.material.as_deref().unwrap_or(NO_MATERIAL_KEY)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// The export unit for one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Mesh-data name
    pub name: String,
    pub groups: Vec<MaterialGroup>,
}

/// Where one material group lives in the geometry files
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSlice<'a> {
    pub group: &'a MaterialGroup,
    /// Geometry asset name (without namespace or extension)
    pub geometry: String,
    /// First vertex of the group inside its geometry file
    pub start: usize,
    /// Vertex count of the group
    pub count: usize,
}

/// One geometry file and the groups it concatenates
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFile<'a> {
    pub name: String,
    pub groups: Vec<&'a MaterialGroup>,
}

impl GeometryFile<'_> {
    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Group for a material, appended on first use
    pub fn group_mut(&mut self, material: Option<&str>) -> &mut MaterialGroup {
        let position = self
            .groups
            .iter()
            .position(|g| g.material.as_deref() == material);

        let index = match position {
            Some(index) => index,
            None => {
                self.groups.push(MaterialGroup {
                    material: material.map(str::to_string),
                    vertices: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        &mut self.groups[index]
    }

    /// Group for a material
    pub fn group(&self, material: Option<&str>) -> Option<&MaterialGroup> {
        self.groups.iter().find(|g| g.material.as_deref() == material)
    }

    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(MaterialGroup::len).sum()
    }

    /// Geometry asset name for a group under a layout
    pub fn geometry_name(&self, group: &MaterialGroup, layout: GeometryLayout) -> String {
        match layout {
            GeometryLayout::Merged => self.name.clone(),
            GeometryLayout::Split => format!("{}_{}", self.name, group.key()),
        }
    }

    /// Start/count bookkeeping for every group, in insertion order
    pub fn slices(&self, layout: GeometryLayout) -> Vec<GroupSlice<'_>> {
        let mut running = 0;
        self.groups
            .iter()
            .map(|group| {
                let start = match layout {
                    GeometryLayout::Merged => running,
                    GeometryLayout::Split => 0,
                };
                running += group.len();
                GroupSlice {
                    group,
                    geometry: self.geometry_name(group, layout),
                    start,
                    count: group.len(),
                }
            })
            .collect()
    }

    /// Geometry files this model produces
    pub fn geometry_files(&self, layout: GeometryLayout) -> Vec<GeometryFile<'_>> {
        match layout {
            GeometryLayout::Merged => vec![GeometryFile {
                name: self.name.clone(),
                groups: self.groups.iter().collect(),
            }],
            GeometryLayout::Split => self
                .groups
                .iter()
                .map(|group| GeometryFile {
                    name: self.geometry_name(group, layout),
                    groups: vec![group],
                })
                .collect(),
        }
    }
}

/// Models keyed by mesh-data name, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    models: Vec<Model>,
    index: HashMap<String, usize>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a model for this mesh data was already extracted
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert a model; an existing model with the same name is kept
    pub fn insert(&mut self, model: Model) -> bool {
        if self.contains(&model.name) {
            return false;
        }
        self.index.insert(model.name.clone(), self.models.len());
        self.models.push(model);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.index.get(name).map(|&i| &self.models[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn vertices(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex::new(Vec3::splat(i as f32), Vec3::Y, Vec2::ZERO))
            .collect()
    }

    fn model() -> Model {
        let mut model = Model::new("Ship");
        model.group_mut(Some("Hull")).vertices = vertices(3);
        model.group_mut(Some("Glass")).vertices = vertices(5);
        model.group_mut(None).vertices = vertices(2);
        model
    }

    #[test]
    fn test_group_insertion_order() {
        let mut model = model();
        model.group_mut(Some("Hull")).vertices.push(vertices(1)[0]);

        let keys: Vec<_> = model.groups.iter().map(MaterialGroup::key).collect();
        assert_eq!(keys, vec!["Hull", "Glass", "none"]);
        assert_eq!(model.group(Some("Hull")).unwrap().len(), 4);
    }

    #[test]
    fn test_merged_slices() {
        let model = model();
        let slices = model.slices(GeometryLayout::Merged);

        let starts: Vec<_> = slices.iter().map(|s| s.start).collect();
        let counts: Vec<_> = slices.iter().map(|s| s.count).collect();
        assert_eq!(starts, vec![0, 3, 8]);
        assert_eq!(counts, vec![3, 5, 2]);
        assert!(slices.iter().all(|s| s.geometry == "Ship"));

        let files = model.geometry_files(GeometryLayout::Merged);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].vertex_count(), 10);
    }

    #[test]
    fn test_split_slices() {
        let model = model();
        let slices = model.slices(GeometryLayout::Split);

        assert!(slices.iter().all(|s| s.start == 0));
        let names: Vec<_> = slices.iter().map(|s| s.geometry.as_str()).collect();
        assert_eq!(names, vec!["Ship_Hull", "Ship_Glass", "Ship_none"]);

        let files = model.geometry_files(GeometryLayout::Split);
        let counts: Vec<_> = files.iter().map(GeometryFile::vertex_count).collect();
        assert_eq!(counts, vec![3, 5, 2]);
    }

    #[test]
    fn test_model_set_keeps_first() {
        let mut set = ModelSet::new();
        assert!(set.insert(model()));
        assert!(!set.insert(Model::new("Ship")));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("Ship").unwrap().vertex_count(), 10);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("Split".parse::<GeometryLayout>(), Ok(GeometryLayout::Split));
        assert!("interleaved".parse::<GeometryLayout>().is_err());
    }
}
