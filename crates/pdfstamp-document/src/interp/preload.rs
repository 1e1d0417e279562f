// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resource preloading — the first pass. Every font and image the script
// names is loaded exactly once, before anything is drawn.

use std::collections::HashMap;
use std::path::Path;

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Command, Opcode};
use tracing::{debug, info, instrument};

use crate::assets::{AssetLoader, FontHandle, ImageAsset};

/// Fonts and images keyed by the path (or name) the script used.
///
/// Filled once by [`ResourceCache::preload`] and read-only afterwards.
#[derive(Debug)]
pub struct ResourceCache {
    fonts: HashMap<String, FontHandle>,
    images: HashMap<String, ImageAsset>,
    default_font: FontHandle,
}

impl ResourceCache {
    /// Scan the whole script, independent of page selection, and load each
    /// distinct asset. `default_font` names the font used when no
    /// `font-file` applies; `None` selects Helvetica.
    #[instrument(skip_all, fields(commands = commands.len()))]
    pub fn preload(
        commands: &[Command],
        loader: &dyn AssetLoader,
        default_font: Option<&Path>,
    ) -> Result<Self> {
        let mut cache = Self {
            fonts: HashMap::new(),
            images: HashMap::new(),
            default_font: FontHandle::default(),
        };

        if let Some(path) = default_font {
            let name = path.to_string_lossy();
            cache.default_font = cache.load_font(loader, &name)?;
        }

        for command in commands {
            match command.opcode() {
                Opcode::Image => {
                    let path = command.arg(0)?.as_str();
                    if !cache.images.contains_key(path) {
                        let image = loader.load_image(path)?;
                        debug!(path, "image preloaded");
                        cache.images.insert(path.to_string(), image);
                    }
                }
                Opcode::FontFile => {
                    cache.load_font(loader, command.arg(0)?.as_str())?;
                }
                Opcode::Text => {
                    if let Some(font) = command.keyword("ff") {
                        cache.load_font(loader, font.as_str())?;
                    }
                }
                _ => {}
            }
        }

        info!(
            fonts = cache.fonts.len(),
            images = cache.images.len(),
            "resources preloaded"
        );
        Ok(cache)
    }

    fn load_font(&mut self, loader: &dyn AssetLoader, name: &str) -> Result<FontHandle> {
        if let Some(handle) = self.fonts.get(name) {
            return Ok(handle.clone());
        }
        let handle = loader.load_font(name)?;
        debug!(name, font = handle.name(), "font preloaded");
        self.fonts.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// A font loaded in the first pass.
    pub fn font(&self, name: &str) -> Result<&FontHandle> {
        self.fonts
            .get(name)
            .ok_or_else(|| StampError::Render(format!("font {name:?} was not preloaded")))
    }

    /// An image loaded in the first pass.
    pub fn image(&self, path: &str) -> Result<&ImageAsset> {
        self.images
            .get(path)
            .ok_or_else(|| StampError::Render(format!("image {path:?} was not preloaded")))
    }

    pub fn default_font(&self) -> &FontHandle {
        &self.default_font
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
