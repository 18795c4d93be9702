//! M2N Scene Sources
//!
//! Read-only access to the scene being exported:
//! - [`SceneSource`], the capability interface a host implements
//! - [`SceneDocument`] / [`Scene`], a JSON-backed implementation used by the
//!   command-line exporter and by tests
//!
//! # Example
//! ```no_run
//! use m2n_scene::{Scene, SceneSource};
//!
//! let scene = Scene::load("level.json").unwrap();
//! for root in scene.roots() {
//!     println!("{}", scene.node_name(root).unwrap_or("?"));
//! }
//! ```

pub mod document;
pub mod material;
pub mod mesh;
pub mod node;
pub mod source;

pub use document::{NodeRecord, Scene, SceneDocument};
pub use material::{Image, ImageSource, Material, TextureSlot, TextureType};
pub use mesh::{Corner, MeshData, MeshVertex, Polygon};
pub use node::{CameraLens, NodeId, NodeKind, SceneNode};
pub use source::SceneSource;
