//! Export pipeline driver
//!
//! Stages run in a fixed order: scene, materials, textures, models,
//! geometry. A failing asset is recorded in the [`ExportReport`] and the
//! run continues; only setup failures abort it.

use std::collections::HashSet;
use std::path::Path;

use m2n_core::{check_asset_name, AssetKind, Error, Result};
use m2n_scene::{Material, SceneSource};

use crate::config::ExportConfig;
use crate::descriptor::{material_descriptor, model_descriptor, SceneSerializer};
use crate::geometry::{extract_model, GeometryEncoder, Model, ModelSet};
use crate::naming::{AssetName, Namespace};
use crate::policy::{AssetWriter, WriteOutcome};
use crate::report::ExportReport;
use crate::textures::{CopyPngTextures, TextureSink};

/// Exports scenes with one configuration
pub struct Exporter {
    config: ExportConfig,
    namespace: Namespace,
    encoder: GeometryEncoder,
    textures: Box<dyn TextureSink>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    /// Create an exporter, rejecting an invalid configuration
    pub fn new(config: ExportConfig) -> Result<Self> {
        let namespace = config.validate()?;
        let encoder = GeometryEncoder::new(config.vertex_attributes)?;

        Ok(Self {
            config,
            namespace,
            encoder,
            textures: Box::new(CopyPngTextures::default()),
        })
    }

    /// Replace the texture sink
    pub fn with_texture_sink(mut self, sink: impl TextureSink + 'static) -> Self {
        self.textures = Box::new(sink);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Export a scene under `root`
    pub fn export<S: SceneSource + ?Sized>(&self, source: &S, root: impl AsRef<Path>) -> Result<ExportReport> {
        let root = root.as_ref();
        let writer = AssetWriter::new(root, self.config.overwrite);
        writer.prepare_dirs(&self.namespace)?;

        tracing::info!(
            scene = %source.scene_name(),
            root = %root.display(),
            namespace = %self.namespace,
            "Exporting scene"
        );

        let mut report = ExportReport::new();
        let models = self.collect_models(source, &mut report);

        if source.node_count() > 1 || self.config.entire_scene {
            self.write_scene(source, &writer, &mut report);
        }
        self.write_materials(source, &writer, &mut report);
        self.write_textures(source, &writer, &mut report);
        self.write_models(&models, &writer, &mut report);
        self.write_geometry(&models, &writer, &mut report);

        for kind in AssetKind::ALL {
            tracing::info!(
                kind = %kind,
                written = report.written_count(kind),
                kept = report.skipped_count(kind),
                "Export stage done"
            );
        }

        Ok(report)
    }

    /// Extract one model per mesh data; the first node using a mesh
    /// decides its material slots
    fn collect_models<S: SceneSource + ?Sized>(&self, source: &S, report: &mut ExportReport) -> ModelSet {
        let mut models = ModelSet::new();
        let mut failed = HashSet::new();

        for (id, mesh_name) in source.mesh_nodes() {
            if models.contains(mesh_name) || failed.contains(mesh_name) {
                continue;
            }

            let extracted = check_asset_name(mesh_name)
                .and_then(|()| {
                    source.mesh(mesh_name).ok_or_else(|| Error::MissingMesh {
                        name: mesh_name.to_string(),
                    })
                })
                .and_then(|mesh| extract_model(mesh, source.material_slots(id)))
                .and_then(|model| check_model_materials(source, model));

            match extracted {
                Ok(model) => {
                    models.insert(model);
                }
                Err(e) => {
                    failed.insert(mesh_name);
                    report.fail(AssetKind::Model, mesh_name, e);
                }
            }
        }

        models
    }

    fn write_scene<S: SceneSource + ?Sized>(&self, source: &S, writer: &AssetWriter, report: &mut ExportReport) {
        if let Err(e) = check_asset_name(source.scene_name()) {
            report.fail(AssetKind::Scene, source.scene_name(), e);
            return;
        }
        let name = AssetName::scene(&self.namespace, source.scene_name());
        let text = SceneSerializer::new(source, &self.namespace).scene();
        self.write(writer, &name, source.scene_name(), text, report);
    }

    fn write_materials<S: SceneSource + ?Sized>(&self, source: &S, writer: &AssetWriter, report: &mut ExportReport) {
        for material in source.materials() {
            if let Err(e) = check_material(source, material) {
                report.fail(AssetKind::Material, &material.name, e);
                continue;
            }
            let name = AssetName::material(&self.namespace, &material.name);
            if !claim(&name, &material.name, report) {
                continue;
            }
            if !writer.should_write(&name) {
                report.record(AssetKind::Material, name.relative_path(), WriteOutcome::Skipped);
                continue;
            }
            let text = material_descriptor(material, &self.namespace);
            self.write(writer, &name, &material.name, text, report);
        }
    }

    /// New file-backed images are always written; anything else only when
    /// the policy allows replacing textures
    fn write_textures<S: SceneSource + ?Sized>(&self, source: &S, writer: &AssetWriter, report: &mut ExportReport) {
        let allow_replace = writer.policy().allows(AssetKind::Texture);

        for image in source.images() {
            if let Err(e) = check_asset_name(&image.name) {
                report.fail(AssetKind::Texture, &image.name, e);
                continue;
            }
            let name = AssetName::texture(&self.namespace, &image.name);
            if !claim(&name, &image.name, report) {
                continue;
            }
            let path = name.path_under(writer.root());
            let wanted = (!path.exists() && image.is_file_backed()) || allow_replace;

            if !wanted {
                report.record(AssetKind::Texture, name.relative_path(), WriteOutcome::Skipped);
                continue;
            }

            match self.textures.write_texture(image, &path) {
                Ok(()) => report.record(AssetKind::Texture, name.relative_path(), WriteOutcome::Written),
                Err(e) => report.fail(AssetKind::Texture, &image.name, e),
            }
        }
    }

    fn write_models(&self, models: &ModelSet, writer: &AssetWriter, report: &mut ExportReport) {
        for model in models.iter() {
            let name = AssetName::model(&self.namespace, &model.name);
            let text = model_descriptor(model, self.config.geometry_layout, &self.namespace);
            self.write(writer, &name, &model.name, text, report);
        }
    }

    fn write_geometry(&self, models: &ModelSet, writer: &AssetWriter, report: &mut ExportReport) {
        for model in models.iter() {
            for file in model.geometry_files(self.config.geometry_layout) {
                let name = AssetName::geometry(&self.namespace, &file.name);
                if !claim(&name, &file.name, report) {
                    continue;
                }
                if !writer.should_write(&name) {
                    report.record(AssetKind::Geometry, name.relative_path(), WriteOutcome::Skipped);
                    continue;
                }

                match self.encoder.encode_file(&file) {
                    Ok(bytes) => self.write(writer, &name, &file.name, bytes, report),
                    Err(e) => report.fail(AssetKind::Geometry, &file.name, e),
                }
            }
        }
    }

    fn write(
        &self,
        writer: &AssetWriter,
        name: &AssetName,
        label: &str,
        contents: impl AsRef<[u8]>,
        report: &mut ExportReport,
    ) {
        if !claim(name, label, report) {
            return;
        }
        match writer.write(name, contents) {
            Ok(outcome) => report.record(name.kind(), name.relative_path(), outcome),
            Err(e) => report.fail(name.kind(), label, e),
        }
    }
}

/// Check that no earlier asset of this run wrote or kept the same output
/// path; a clash is recorded as a failure
fn claim(name: &AssetName, label: &str, report: &mut ExportReport) -> bool {
    let path = name.relative_path();
    if report.claims(&path) {
        report.fail(
            name.kind(),
            label,
            Error::invalid_data(format!("output path {} is already used by another asset", path)),
        );
        return false;
    }
    true
}

/// Every material a model uses must be defined by the source
fn check_model_materials<S: SceneSource + ?Sized>(source: &S, model: Model) -> Result<Model> {
    for material in model.groups.iter().filter_map(|g| g.material.as_deref()) {
        check_asset_name(material)?;
        if !source.materials().iter().any(|m| m.name == material) {
            return Err(Error::UnresolvedReference {
                kind: "material".into(),
                name: material.to_string(),
            });
        }
    }
    Ok(model)
}

/// A material file name must be usable and every texture it binds must
/// name a source image
fn check_material<S: SceneSource + ?Sized>(source: &S, material: &Material) -> Result<()> {
    check_asset_name(&material.name)?;
    for (_, image) in material.image_slots() {
        if source.image(image).is_none() {
            return Err(Error::UnresolvedReference {
                kind: "image".into(),
                name: image.to_string(),
            });
        }
    }
    Ok(())
}
