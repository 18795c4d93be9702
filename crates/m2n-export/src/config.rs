//! Export configuration
//!
//! One [`ExportConfig`] is passed to [`crate::Exporter::new`] per export.
//! It can be written by hand as YAML or JSON:
//!
//! ```yaml
//! namespace: level1
//! geometry_layout: split
//! overwrite:
//!   materials: true
//! ```

use std::path::Path;

use m2n_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryLayout, VertexAttributes};
use crate::naming::Namespace;
use crate::policy::OverwritePolicy;

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path prefix for every asset, empty for none
    pub namespace: String,
    /// Which existing files may be replaced
    pub overwrite: OverwritePolicy,
    /// Write the scene descriptor even for a single-node scene
    pub entire_scene: bool,
    /// Merged or split geometry files
    pub geometry_layout: GeometryLayout,
    /// Attribute set written to geometry files
    pub vertex_attributes: VertexAttributes,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            overwrite: OverwritePolicy::default(),
            entire_scene: false,
            geometry_layout: GeometryLayout::Merged,
            vertex_attributes: VertexAttributes::PositionTexCoordNormal,
        }
    }
}

impl ExportConfig {
    /// Check the configuration and return the parsed namespace
    pub fn validate(&self) -> Result<Namespace> {
        if !self.vertex_attributes.is_supported() {
            return Err(Error::UnsupportedVertexAttributes {
                attributes: self.vertex_attributes.to_string(),
            });
        }
        Namespace::new(&self.namespace)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            Some("json") => Self::from_json(&text),
            _ => Err(Error::invalid_data("expected a .yaml, .yml or .json file")),
        };
        config.with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use m2n_core::AssetKind;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.geometry_layout, GeometryLayout::Merged);
        assert!(config.overwrite.allows(AssetKind::Geometry));
        assert!(!config.overwrite.allows(AssetKind::Texture));
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_partial_yaml() {
        let config = ExportConfig::from_yaml(
            "namespace: level1\ngeometry_layout: split\noverwrite:\n  materials: true\n",
        )
        .unwrap();

        assert_eq!(config.geometry_layout, GeometryLayout::Split);
        assert!(config.overwrite.materials);
        assert!(config.overwrite.scenes);
        assert_eq!(config.validate().unwrap().as_str(), "level1/");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ExportConfig {
            namespace: "pack".into(),
            entire_scene: true,
            vertex_attributes: VertexAttributes::PositionTexCoord,
            ..ExportConfig::default()
        };
        let again = ExportConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_validate_rejects() {
        let skinned = ExportConfig {
            vertex_attributes: VertexAttributes::Skinned,
            ..ExportConfig::default()
        };
        assert!(skinned.validate().unwrap_err().is_config_error());

        let escaping = ExportConfig {
            namespace: "../outside".into(),
            ..ExportConfig::default()
        };
        assert!(escaping.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("export.json");
        std::fs::write(&json, r#"{ "entire_scene": true }"#).unwrap();
        assert!(ExportConfig::load(&json).unwrap().entire_scene);

        let yaml = dir.path().join("export.yml");
        std::fs::write(&yaml, "entire_scene: true\n").unwrap();
        assert!(ExportConfig::load(&yaml).unwrap().entire_scene);

        let toml = dir.path().join("export.toml");
        std::fs::write(&toml, "entire_scene = true\n").unwrap();
        let err = ExportConfig::load(&toml).unwrap_err();
        assert!(err.to_string().contains("export.toml"));
    }
}
