//! Common types used across M2N
//!
//! This module provides shared type definitions used by the scene source and
//! the export pipeline.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Local transform of a scene node
///
/// Rotation is stored as Euler angles in radians, XYZ order
/// (`R = Rz * Ry * Rx`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    /// Exact comparison against the identity transform, no tolerance
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One exported vertex, already in target space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Kind of file produced by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Scene,
    Model,
    Material,
    Geometry,
    Texture,
}

impl AssetKind {
    /// All kinds, in the order the pipeline writes them
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Scene,
        AssetKind::Material,
        AssetKind::Texture,
        AssetKind::Model,
        AssetKind::Geometry,
    ];

    /// Directory under the export root, with trailing slash
    pub fn directory(&self) -> &'static str {
        match self {
            AssetKind::Scene => "assets/scenes/",
            AssetKind::Model => "assets/models/",
            AssetKind::Material => "assets/materials/",
            AssetKind::Geometry => "assets/geometry/",
            AssetKind::Texture => "assets/textures/",
        }
    }

    /// Tag used in reference strings. Scenes are never referenced.
    pub fn reference_tag(&self) -> Option<&'static str> {
        match self {
            AssetKind::Scene => None,
            AssetKind::Model => Some("model"),
            AssetKind::Material => Some("material"),
            AssetKind::Geometry => Some("geom"),
            AssetKind::Texture => Some("tex2d"),
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Scene => "scene",
            AssetKind::Model => "model",
            AssetKind::Material => "mat",
            AssetKind::Geometry => "geom",
            AssetKind::Texture => "png",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetKind::Scene => "scene",
            AssetKind::Model => "model",
            AssetKind::Material => "material",
            AssetKind::Geometry => "geometry",
            AssetKind::Texture => "texture",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scene" => Ok(AssetKind::Scene),
            "model" => Ok(AssetKind::Model),
            "material" | "mat" => Ok(AssetKind::Material),
            "geometry" | "geom" => Ok(AssetKind::Geometry),
            "texture" | "tex2d" => Ok(AssetKind::Texture),
            _ => Err(format!("Unknown asset kind: {}", s)),
        }
    }
}

/// Check that an asset name is usable as one file name under an asset
/// directory
pub fn check_asset_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "empty name"
    } else if name.contains('/') || name.contains('\\') {
        "path separators are not allowed"
    } else if name == "." || name == ".." {
        "relative components are not allowed"
    } else if name.contains('\0') {
        "NUL is not allowed"
    } else {
        return Ok(());
    };
    Err(Error::invalid_asset_name(name, reason))
}
