//! M2N Core Library
//!
//! This crate provides common types, logging setup and error handling
//! shared across all M2N components.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
