// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image assets — raster files decoded with the `image` crate and kept in the
// form they will be embedded in.

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, ImageFormat};
use pdfstamp_core::error::{Result, StampError};
use tracing::{debug, info, instrument};

/// Pixel data ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Baseline JPEG passed through untouched as DCT data.
    Jpeg { bytes: Vec<u8>, gray: bool },
    /// 8-bit RGB samples plus an optional 8-bit alpha plane.
    Raw { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded image and its natural size.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    path: PathBuf,
    width: u32,
    height: u32,
    data: ImageData,
}

impl ImageAsset {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| StampError::resource(path, err))?;
        let asset = Self::from_bytes(path, bytes)?;
        info!(width = asset.width, height = asset.height, "Image loaded");
        Ok(asset)
    }

    /// Decode raw encoded bytes (JPEG, PNG, GIF, ...).
    #[instrument(skip_all, fields(data_len = bytes.len()))]
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let format = image::guess_format(&bytes)
            .map_err(|err| StampError::resource(&path, format!("unknown image format: {err}")))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|err| StampError::resource(&path, format!("failed to decode image: {err}")))?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(StampError::Image(format!("{} has no pixels", path.display())));
        }

        let color = decoded.color();
        if format == ImageFormat::Jpeg && matches!(color, ColorType::L8 | ColorType::Rgb8) {
            debug!(?color, "JPEG kept as DCT data");
            return Ok(Self {
                width: decoded.width(),
                height: decoded.height(),
                data: ImageData::Jpeg {
                    bytes,
                    gray: color == ColorType::L8,
                },
                path,
            });
        }

        Ok(Self::from_dynamic(path, decoded))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let alpha = if image.color().has_alpha() {
            let plane: Vec<u8> = image.to_rgba8().pixels().map(|px| px.0[3]).collect();
            // A fully opaque alpha plane is dropped rather than embedded.
            plane.iter().any(|&a| a != u8::MAX).then_some(plane)
        } else {
            None
        };
        let rgb = image.to_rgb8().into_raw();
        debug!(width, height, has_alpha = alpha.is_some(), "Image decoded to RGB");

        Self {
            path: path.into(),
            width,
            height,
            data: ImageData::Raw { rgb, alpha },
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    /// Size in points when no explicit width or height is requested: one
    /// pixel per point.
    pub fn natural_size(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }
}
