//! Asset names, reference strings and output paths
//!
//! A reference and the file it points at are both derived from one
//! [`AssetName`], so descriptors and the files on disk always agree:
//!
//! ```text
//! model:assets/models/<ns><name>.model   ->  <root>/assets/models/<ns><name>.model
//! ```

use std::path::{Path, PathBuf};

use m2n_core::{AssetKind, Error, Result};
use serde::{Deserialize, Serialize};

/// Path prefix scoping every asset of one export
///
/// Either empty or a relative path ending in `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// The empty namespace
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse and normalise a namespace; a missing trailing `/` is added
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self::root());
        }

        if raw.trim() != raw {
            return Err(Error::invalid_namespace(raw, "leading or trailing whitespace"));
        }
        if raw.contains('\\') {
            return Err(Error::invalid_namespace(raw, "backslashes are not allowed"));
        }
        if raw.starts_with('/') {
            return Err(Error::invalid_namespace(raw, "must be relative"));
        }

        let body = raw.strip_suffix('/').unwrap_or(raw);
        for component in body.split('/') {
            match component {
                "" => return Err(Error::invalid_namespace(raw, "empty path component")),
                "." | ".." => {
                    return Err(Error::invalid_namespace(raw, "relative components are not allowed"))
                }
                _ => {}
            }
        }

        Ok(Self(format!("{}/", body)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.0
    }
}

/// Replace the last extension of an image name with `.png`
pub fn png_filename(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) => format!("{}.png", &name[..pos]),
        None => format!("{}.png", name),
    }
}

/// A namespaced asset of one kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetName {
    kind: AssetKind,
    file_name: String,
    namespace: Namespace,
}

impl AssetName {
    /// Name an asset; texture names are normalised to `.png`
    pub fn new(kind: AssetKind, namespace: &Namespace, name: &str) -> Self {
        let file_name = match kind {
            AssetKind::Texture => png_filename(name),
            _ => format!("{}.{}", name, kind.extension()),
        };

        Self {
            kind,
            file_name,
            namespace: namespace.clone(),
        }
    }

    pub fn scene(namespace: &Namespace, name: &str) -> Self {
        Self::new(AssetKind::Scene, namespace, name)
    }

    pub fn model(namespace: &Namespace, name: &str) -> Self {
        Self::new(AssetKind::Model, namespace, name)
    }

    pub fn material(namespace: &Namespace, name: &str) -> Self {
        Self::new(AssetKind::Material, namespace, name)
    }

    pub fn geometry(namespace: &Namespace, name: &str) -> Self {
        Self::new(AssetKind::Geometry, namespace, name)
    }

    pub fn texture(namespace: &Namespace, image: &str) -> Self {
        Self::new(AssetKind::Texture, namespace, image)
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// File name including extension, without directories
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path relative to the export root, always `/`-separated
    pub fn relative_path(&self) -> String {
        format!("{}{}{}", self.kind.directory(), self.namespace, self.file_name)
    }

    /// Path of the file under an export root
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }

    /// Reference string, `None` for scenes which are never referenced
    pub fn reference(&self) -> Option<String> {
        self.kind
            .reference_tag()
            .map(|tag| format!("{}:{}", tag, self.relative_path()))
    }
}

impl std::fmt::Display for AssetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reference() {
            Some(reference) => f.write_str(&reference),
            None => f.write_str(&self.relative_path()),
        }
    }
}

/// Split a reference string into its kind and relative path
pub fn parse_reference(reference: &str) -> Option<(AssetKind, &str)> {
    let (tag, path) = reference.split_once(':')?;
    let kind = AssetKind::ALL
        .into_iter()
        .find(|kind| kind.reference_tag() == Some(tag))?;
    path.starts_with(kind.directory()).then_some((kind, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_normalisation() {
        assert_eq!(Namespace::new("").unwrap().as_str(), "");
        assert_eq!(Namespace::new("level1").unwrap().as_str(), "level1/");
        assert_eq!(Namespace::new("pack/level1/").unwrap().as_str(), "pack/level1/");
    }

    #[test]
    fn test_namespace_rejects_escapes() {
        assert!(Namespace::new("../up").is_err());
        assert!(Namespace::new("/abs").is_err());
        assert!(Namespace::new("a//b").is_err());
        assert!(Namespace::new("a\\b").is_err());
        assert!(Namespace::new("a/./b").is_err());
    }

    #[test]
    fn test_namespace_rejects_surrounding_whitespace() {
        for raw in [" lvl", "lvl ", "lvl/\t", "  "] {
            assert!(
                matches!(Namespace::new(raw), Err(Error::InvalidNamespace { .. })),
                "{raw:?} should be rejected"
            );
        }
        assert_eq!(Namespace::new("my level").unwrap().as_str(), "my level/");
    }

    #[test]
    fn test_reference_formats() {
        let ns = Namespace::new("lvl").unwrap();

        assert_eq!(
            AssetName::model(&ns, "Cube").reference().unwrap(),
            "model:assets/models/lvl/Cube.model"
        );
        assert_eq!(
            AssetName::material(&ns, "Hull").reference().unwrap(),
            "material:assets/materials/lvl/Hull.mat"
        );
        assert_eq!(
            AssetName::geometry(&ns, "Cube_Hull").reference().unwrap(),
            "geom:assets/geometry/lvl/Cube_Hull.geom"
        );
        assert_eq!(
            AssetName::texture(&ns, "hull.diffuse.jpg").reference().unwrap(),
            "tex2d:assets/textures/lvl/hull.diffuse.png"
        );
    }

    #[test]
    fn test_scene_has_no_reference() {
        let name = AssetName::scene(&Namespace::root(), "Level");
        assert_eq!(name.reference(), None);
        assert_eq!(name.relative_path(), "assets/scenes/Level.scene");
    }

    #[test]
    fn test_reference_matches_path() {
        let ns = Namespace::new("a/b").unwrap();
        let name = AssetName::geometry(&ns, "Rock");
        let reference = name.reference().unwrap();

        let (kind, path) = parse_reference(&reference).unwrap();
        assert_eq!(kind, AssetKind::Geometry);
        assert_eq!(path, name.relative_path());
        assert_eq!(
            name.path_under(Path::new("/out")),
            Path::new("/out/assets/geometry/a/b/Rock.geom")
        );
    }

    #[test]
    fn test_png_filename() {
        assert_eq!(png_filename("wood.jpg"), "wood.png");
        assert_eq!(png_filename("wood"), "wood.png");
        assert_eq!(png_filename("wood.png"), "wood.png");
    }

    #[test]
    fn test_namespace_serde() {
        let ns: Namespace = serde_json::from_str("\"pack\"").unwrap();
        assert_eq!(ns.as_str(), "pack/");
        assert!(serde_json::from_str::<Namespace>("\"../x\"").is_err());
    }
}
