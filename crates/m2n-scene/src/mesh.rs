//! Source mesh data
//!
//! Polygons are stored the way a modelling tool holds them: n-gons with
//! per-corner attributes. Triangulation happens at export time.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Mesh data shared by any number of mesh nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Mesh-data name (distinct from node names)
    pub name: String,
    /// Points, referenced by polygon corners
    #[serde(default)]
    pub vertices: Vec<MeshVertex>,
    /// Faces in traversal order
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

/// A mesh point with its vertex normal, in source space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: Vec3,
    #[serde(default)]
    pub normal: Vec3,
}

/// A face with three or more corners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Index into the owning node's material slots
    #[serde(default)]
    pub material_index: usize,
    pub corners: Vec<Corner>,
}

/// One polygon corner (loop)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    /// Index into `MeshData::vertices`
    pub vertex: u32,
    /// Coordinate from the active UV layer, `None` when the mesh has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<Vec2>,
}

impl Corner {
    pub fn new(vertex: u32, uv: Option<Vec2>) -> Self {
        Self { vertex, uv }
    }
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            polygons: Vec::new(),
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get polygon count
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Number of triangles after fan triangulation
    pub fn triangle_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.corners.len().saturating_sub(2))
            .sum()
    }

    /// Check if the mesh carries an active UV layer
    pub fn has_uv_layer(&self) -> bool {
        self.corners().next().is_some() && self.corners().all(|c| c.uv.is_some())
    }

    /// Iterate all polygon corners in traversal order
    pub fn corners(&self) -> impl Iterator<Item = &Corner> {
        self.polygons.iter().flat_map(|p| p.corners.iter())
    }

    /// Check structural consistency: corner indices in range and
    /// UV coordinates on either every corner or none
    pub fn validate(&self) -> Result<(), String> {
        for (face, polygon) in self.polygons.iter().enumerate() {
            for corner in &polygon.corners {
                if corner.vertex as usize >= self.vertices.len() {
                    return Err(format!(
                        "mesh '{}' polygon {} references vertex {} of {}",
                        self.name,
                        face,
                        corner.vertex,
                        self.vertices.len()
                    ));
                }
            }
        }

        let with_uv = self.corners().filter(|c| c.uv.is_some()).count();
        if with_uv != 0 && with_uv != self.corners().count() {
            return Err(format!(
                "mesh '{}' has UV coordinates on only {} of {} corners",
                self.name,
                with_uv,
                self.corners().count()
            ));
        }

        Ok(())
    }
}
