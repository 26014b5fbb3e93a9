//! Image resources
//!
//! Images are decoded once into RGBA pixels and shared across frames by
//! reference counting; GPU upload happens lazily in the renderer, keyed by
//! the image's stable id.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;
use scrim_core::{Result, ScrimError};
use tracing::warn;

/// A decoded image shared by draw commands
pub struct Image {
    id: u64,
    pixels: RgbaImage,
}

impl Image {
    /// Decode an image file.
    ///
    /// A missing file is an expected authoring situation and maps to
    /// `Ok(None)`; a file that exists but fails to decode is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "image file not found");
            return Ok(None);
        }

        let decoded = image::open(path).map_err(|err| {
            ScrimError::resource(format!("Failed to decode image {}: {err}", path.display()))
        })?;

        Ok(Some(Self::from_pixels(decoded.to_rgba8())))
    }

    /// Wrap raw RGBA pixels (row-major, 4 bytes per pixel)
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        let pixels = RgbaImage::from_raw(width, height, data)
            .expect("pixel buffer length must be width * height * 4");
        Self::from_pixels(pixels)
    }

    fn from_pixels(pixels: RgbaImage) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    /// Stable identifier, unique per decoded resource
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Pixel dimensions
    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw RGBA bytes
    pub fn data(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("size", &self.size())
            .finish()
    }
}
