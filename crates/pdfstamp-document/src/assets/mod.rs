// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asset loading — fonts and images referenced by a stamping script.

pub mod font;
pub mod image;

use std::path::Path;
use std::sync::Arc;

use pdfstamp_core::error::{Result, StampError};
use tracing::debug;

pub use font::{FontAsset, FontHandle, FontMetrics, StandardFont};
pub use self::image::{ImageAsset, ImageData};

/// Source of fonts and images. The interpreter only talks to assets through
/// this trait, so tests can count or fake loads.
pub trait AssetLoader {
    /// Resolve a font name: a font file path, or one of the 14 standard
    /// font names.
    fn load_font(&self, name: &str) -> Result<FontHandle>;

    /// Load and decode an image file.
    fn load_image(&self, path: &str) -> Result<ImageAsset>;
}

/// Loads assets from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl AssetLoader for FsLoader {
    fn load_font(&self, name: &str) -> Result<FontHandle> {
        let path = Path::new(name);
        if path.is_file() {
            return Ok(FontHandle::Embedded(Arc::new(FontAsset::open(path)?)));
        }
        if let Some(standard) = StandardFont::from_name(name) {
            debug!(font = %standard, "standard font selected");
            return Ok(FontHandle::Standard(standard));
        }
        Err(StampError::resource(path, "no such font file"))
    }

    fn load_image(&self, path: &str) -> Result<ImageAsset> {
        ImageAsset::open(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_font_names_resolve_without_a_file() {
        let handle = FsLoader.load_font("Courier-Bold").unwrap();
        assert_eq!(handle, FontHandle::Standard(StandardFont::CourierBold));
    }

    #[test]
    fn unknown_font_is_a_resource_error() {
        let err = FsLoader.load_font("/no/such/font.ttf").unwrap_err();
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }

    #[test]
    fn image_files_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        ::image::RgbImage::from_pixel(3, 5, ::image::Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        let asset = FsLoader.load_image(path.to_str().unwrap()).unwrap();
        assert_eq!(asset.natural_size(), (3.0, 5.0));
    }
}
