//! Overwrite policy and the gated file writer

use std::path::{Path, PathBuf};

use m2n_core::{AssetKind, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::naming::{AssetName, Namespace};

/// Per-kind permission to replace an existing file
///
/// A file that does not exist yet is always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverwritePolicy {
    pub scenes: bool,
    pub models: bool,
    pub materials: bool,
    pub geometry: bool,
    pub textures: bool,
}

impl Default for OverwritePolicy {
    fn default() -> Self {
        Self {
            scenes: true,
            models: true,
            materials: false,
            geometry: true,
            textures: false,
        }
    }
}

impl OverwritePolicy {
    /// Policy that replaces everything
    pub fn all() -> Self {
        Self::uniform(true)
    }

    /// Policy that never replaces an existing file
    pub fn none() -> Self {
        Self::uniform(false)
    }

    fn uniform(value: bool) -> Self {
        Self {
            scenes: value,
            models: value,
            materials: value,
            geometry: value,
            textures: value,
        }
    }

    /// Check if an existing file of this kind may be replaced
    pub fn allows(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Scene => self.scenes,
            AssetKind::Model => self.models,
            AssetKind::Material => self.materials,
            AssetKind::Geometry => self.geometry,
            AssetKind::Texture => self.textures,
        }
    }

    pub fn set(&mut self, kind: AssetKind, value: bool) {
        match kind {
            AssetKind::Scene => self.scenes = value,
            AssetKind::Model => self.models = value,
            AssetKind::Material => self.materials = value,
            AssetKind::Geometry => self.geometry = value,
            AssetKind::Texture => self.textures = value,
        }
    }
}

/// What happened to one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Written,
    /// Left untouched because it exists and its kind may not be replaced
    Skipped,
}

/// Writes assets under an export root, consulting the policy first
#[derive(Debug, Clone)]
pub struct AssetWriter {
    root: PathBuf,
    policy: OverwritePolicy,
}

impl AssetWriter {
    pub fn new(root: impl Into<PathBuf>, policy: OverwritePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &OverwritePolicy {
        &self.policy
    }

    /// Create the output directory of every asset kind
    pub fn prepare_dirs(&self, namespace: &Namespace) -> Result<()> {
        for kind in AssetKind::ALL {
            let dir = self
                .root
                .join(kind.directory())
                .join(namespace.as_str());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Check if the asset would be written
    pub fn should_write(&self, name: &AssetName) -> bool {
        !name.path_under(&self.root).exists() || self.policy.allows(name.kind())
    }

    /// Write an asset unless the policy keeps the existing file
    pub fn write(&self, name: &AssetName, contents: impl AsRef<[u8]>) -> Result<WriteOutcome> {
        if !self.should_write(name) {
            tracing::debug!(kind = %name.kind(), path = %name.relative_path(), "Keeping existing file");
            return Ok(WriteOutcome::Skipped);
        }

        let path = name.path_under(&self.root);
        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(kind = %name.kind(), path = %name.relative_path(), "Wrote file");
        Ok(WriteOutcome::Written)
    }
}
