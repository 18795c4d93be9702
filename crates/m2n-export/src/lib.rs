//! M2N Export Pipeline
//!
//! Turns a [`m2n_scene::SceneSource`] into an asset bundle:
//! - Scene, model and material descriptors (Lua tables)
//! - Binary geometry files (merged or split per material)
//! - PNG textures
//!
//! # Example
//! ```no_run
//! use m2n_export::{ExportConfig, Exporter};
//! use m2n_scene::Scene;
//!
//! let scene = Scene::load("level.json").unwrap();
//! let exporter = Exporter::new(ExportConfig::default()).unwrap();
//! let report = exporter.export(&scene, "out").unwrap();
//! println!("{}", report);
//! ```

pub mod config;
pub mod convert;
pub mod descriptor;
pub mod exporter;
pub mod geometry;
pub mod naming;
pub mod policy;
pub mod report;
pub mod textures;

pub use config::ExportConfig;
pub use exporter::Exporter;
pub use geometry::{GeometryLayout, Model, ModelSet, VertexAttributes};
pub use naming::{AssetName, Namespace};
pub use policy::{AssetWriter, OverwritePolicy, WriteOutcome};
pub use report::{AssetFailure, ExportReport};
pub use textures::{CopyPngTextures, TextureError, TextureSink};
