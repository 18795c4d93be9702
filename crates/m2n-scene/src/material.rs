//! Materials, texture slots and images

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A material with its texture slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub texture_slots: Vec<TextureSlot>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture_slots: Vec::new(),
        }
    }

    /// Slots holding an image texture, in slot order
    pub fn image_slots(&self) -> impl Iterator<Item = (u32, &str)> {
        self.texture_slots.iter().filter_map(|slot| match (&slot.texture_type, &slot.image) {
            (TextureType::Image, Some(image)) => Some((slot.slot, image.as_str())),
            _ => None,
        })
    }
}

/// One populated texture slot of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSlot {
    /// Slot index, becomes the `uTexture<slot>` uniform name
    pub slot: u32,
    #[serde(default, rename = "type")]
    pub texture_type: TextureType,
    /// Image name for image textures
    #[serde(default)]
    pub image: Option<String>,
}

/// Texture type of a slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureType {
    #[default]
    Image,
    /// Generated by the host (noise, gradients, ...), never exported
    Procedural,
}

/// Where an image's pixels come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Backed by a file on disk
    #[default]
    File,
    /// Packed into the host document
    Packed,
    /// Generated in memory
    Generated,
}

/// An image referenced by texture slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub name: String,
    #[serde(default)]
    pub source: ImageSource,
    /// Backing file for `ImageSource::File`
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

impl Image {
    /// Check if the image is backed by a file
    pub fn is_file_backed(&self) -> bool {
        self.source == ImageSource::File
    }
}
