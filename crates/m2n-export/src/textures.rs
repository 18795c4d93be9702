//! Texture output
//!
//! Descriptors always reference textures as `.png`. Producing the pixels
//! is delegated to a [`TextureSink`]; the default sink copies images that
//! already are PNG files and refuses everything else.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use m2n_scene::Image;
use thiserror::Error;

/// Texture output errors
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image '{0}' has no file to read from")]
    MissingSource(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Writes one image as a PNG texture file
pub trait TextureSink {
    fn write_texture(&self, image: &Image, destination: &Path) -> TextureResult<()>;
}

/// Copies PNG source files byte for byte
///
/// Relative image paths are resolved against `base_dir`, normally the
/// directory holding the scene document.
#[derive(Debug, Clone, Default)]
pub struct CopyPngTextures {
    base_dir: PathBuf,
}

impl CopyPngTextures {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Source file of an image
    pub fn resolve(&self, image: &Image) -> TextureResult<PathBuf> {
        let path = image
            .filepath
            .as_ref()
            .ok_or_else(|| TextureError::MissingSource(image.name.clone()))?;

        Ok(if path.is_absolute() {
            path.clone()
        } else {
            self.base_dir.join(path)
        })
    }
}

impl TextureSink for CopyPngTextures {
    fn write_texture(&self, image: &Image, destination: &Path) -> TextureResult<()> {
        let source = self.resolve(image)?;
        let bytes = std::fs::read(&source)?;

        let format = image::guess_format(&bytes)?;
        if format != ImageFormat::Png {
            return Err(TextureError::UnsupportedFormat(format!(
                "{} is {:?}; only PNG sources can be exported",
                source.display(),
                format
            )));
        }

        let (width, height) =
            ImageReader::with_format(Cursor::new(&bytes), ImageFormat::Png).into_dimensions()?;
        tracing::debug!(image = %image.name, width, height, "Copying texture");

        std::fs::write(destination, &bytes)?;
        Ok(())
    }
}
