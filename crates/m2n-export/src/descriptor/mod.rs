//! Descriptor files
//!
//! Scene, model and material descriptors are Lua chunks that `return` one
//! table. Assets reference each other through [`crate::naming::AssetName`]
//! reference strings.

pub mod lua;
pub mod material;
pub mod model;
pub mod scene;

pub use material::material_descriptor;
pub use model::model_descriptor;
pub use scene::SceneSerializer;
