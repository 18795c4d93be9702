//! M2N CLI
//!
//! Command-line interface for exporting scene documents to M2N asset
//! bundles and inspecting the files it produces.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use m2n_core::logging::{init_with_config, TracingConfig};
use m2n_core::AssetKind;
use m2n_export::geometry::decode;
use m2n_export::{
    AssetName, CopyPngTextures, ExportConfig, ExportReport, Exporter, GeometryLayout, Namespace,
    VertexAttributes,
};
use m2n_scene::{Scene, SceneSource};

/// M2N - export 3D scenes as Lua descriptors and binary geometry
#[derive(Parser)]
#[command(name = "m2n")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for reports
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene document
    Export(ExportArgs),

    /// Decode a geometry file and show its contents
    Inspect(InspectArgs),

    /// Show the reference string and path of an asset
    Names(NamesArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the JSON scene document
    #[arg(short, long)]
    scene: PathBuf,

    /// Export root directory
    #[arg(short, long)]
    output: PathBuf,

    /// YAML or JSON export configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Namespace prefix for every asset
    #[arg(short, long)]
    namespace: Option<String>,

    /// Geometry layout: merged, split
    #[arg(long)]
    layout: Option<GeometryLayout>,

    /// Vertex attributes: position_tex_coord, position_tex_coord_normal
    #[arg(long)]
    vertex_attributes: Option<VertexAttributes>,

    /// Write the scene descriptor even for a single-node scene
    #[arg(long)]
    entire_scene: bool,

    /// Replace existing scene files
    #[arg(long)]
    overwrite_scenes: Option<bool>,

    /// Replace existing model files
    #[arg(long)]
    overwrite_models: Option<bool>,

    /// Replace existing material files
    #[arg(long)]
    overwrite_materials: Option<bool>,

    /// Replace existing geometry files
    #[arg(long)]
    overwrite_geometry: Option<bool>,

    /// Replace existing textures
    #[arg(long)]
    overwrite_textures: Option<bool>,
}

impl ExportArgs {
    /// Apply command-line overrides on top of a loaded configuration
    fn apply(&self, config: &mut ExportConfig) {
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(layout) = self.layout {
            config.geometry_layout = layout;
        }
        if let Some(attributes) = self.vertex_attributes {
            config.vertex_attributes = attributes;
        }
        if self.entire_scene {
            config.entire_scene = true;
        }

        let overrides = [
            (AssetKind::Scene, self.overwrite_scenes),
            (AssetKind::Model, self.overwrite_models),
            (AssetKind::Material, self.overwrite_materials),
            (AssetKind::Geometry, self.overwrite_geometry),
            (AssetKind::Texture, self.overwrite_textures),
        ];
        for (kind, value) in overrides {
            if let Some(value) = value {
                config.overwrite.set(kind, value);
            }
        }
    }
}

#[derive(Args)]
struct InspectArgs {
    /// Path to a .geom file
    path: PathBuf,
}

#[derive(Args)]
struct NamesArgs {
    /// Asset kind: scene, model, material, geometry, texture
    kind: AssetKind,

    /// Bare asset name
    name: String,

    /// Namespace prefix
    #[arg(short, long, default_value = "")]
    namespace: String,
}

fn setup_logging(verbosity: u8) {
    init_with_config(&TracingConfig::from_verbosity(verbosity));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
        Commands::Names(args) => cmd_names(args, cli.format),
    }
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => ExportConfig::default(),
    };
    args.apply(&mut config);

    info!("Loading scene: {:?}", args.scene);
    let scene = Scene::load(&args.scene).context("Failed to load scene document")?;

    let base_dir = args
        .scene
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let exporter = Exporter::new(config)
        .context("Invalid export configuration")?
        .with_texture_sink(CopyPngTextures::new(base_dir));
    let report = exporter
        .export(&scene, &args.output)
        .with_context(|| format!("Failed to export scene '{}'", scene.scene_name()))?;

    print_report(&report, format)?;

    if !report.is_success() {
        bail!("{} asset(s) failed to export", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &ExportReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", report),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let path = &args.path;
    if !path.exists() {
        bail!("File not found: {:?}", path);
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let geometry = decode(&bytes).with_context(|| format!("Failed to decode {:?}", path))?;
    let bounds = geometry.bounds();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": path,
                "format": geometry.format,
                "vertex_count": geometry.vertex_count(),
                "bounds": bounds.map(|(min, max)| [min.to_array(), max.to_array()]),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Geometry: {:?}", path);
            println!("  Format:        {}", geometry.format);
            println!("  Vertices:      {}", geometry.vertex_count());
            println!("  Triangles:     {}", geometry.vertex_count() / 3);
            match bounds {
                Some((min, max)) => {
                    println!("  Bounds min:    [{}, {}, {}]", min.x, min.y, min.z);
                    println!("  Bounds max:    [{}, {}, {}]", max.x, max.y, max.z);
                }
                None => println!("  Bounds:        (empty)"),
            }
        }
    }

    Ok(())
}

fn cmd_names(args: NamesArgs, format: OutputFormat) -> Result<()> {
    let namespace = Namespace::new(&args.namespace).context("Invalid namespace")?;
    let name = AssetName::new(args.kind, &namespace, &args.name);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "kind": args.kind,
                "reference": name.reference(),
                "path": name.relative_path(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Reference: {}", name.reference().as_deref().unwrap_or("-"));
            println!("Path:      {}", name.relative_path());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_overrides() {
        let cli = Cli::try_parse_from([
            "m2n", "export", "-s", "level.json", "-o", "out", "--namespace", "lvl",
            "--layout", "split", "--overwrite-materials", "true", "--overwrite-scenes", "false",
        ])
        .unwrap();

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        let mut config = ExportConfig::default();
        args.apply(&mut config);

        assert_eq!(config.namespace, "lvl");
        assert_eq!(config.geometry_layout, GeometryLayout::Split);
        assert!(config.overwrite.materials);
        assert!(!config.overwrite.scenes);
        assert!(config.overwrite.geometry);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["m2n", "names", "tex2d", "wood.jpg", "-vv", "--format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Names(NamesArgs { kind: AssetKind::Texture, .. })));
    }
}
