// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font assets — the 14 standard PDF fonts and TrueType/OpenType programs
// parsed with `ttf-parser`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfstamp_core::error::{Result, StampError};
use tracing::{debug, instrument};

/// The standard Type 1 fonts every PDF viewer provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    pub const ALL: [StandardFont; 14] = [
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaOblique,
        Self::HelveticaBoldOblique,
        Self::TimesRoman,
        Self::TimesBold,
        Self::TimesItalic,
        Self::TimesBoldItalic,
        Self::Courier,
        Self::CourierBold,
        Self::CourierOblique,
        Self::CourierBoldOblique,
        Self::Symbol,
        Self::ZapfDingbats,
    ];

    /// PostScript name written as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Case-insensitive lookup by PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|font| font.base_font().eq_ignore_ascii_case(name.trim()))
    }

    /// Symbol and ZapfDingbats use their built-in encodings.
    pub fn uses_win_ansi(&self) -> bool {
        !matches!(self, Self::Symbol | Self::ZapfDingbats)
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_font())
    }
}

/// Font-wide metrics in PDF glyph space (1000 units per em).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub italic_angle: f32,
    pub bbox: [i32; 4],
    pub fixed_pitch: bool,
}

/// A TrueType or OpenType font program loaded from disk.
#[derive(Debug)]
pub struct FontAsset {
    path: PathBuf,
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    metrics: FontMetrics,
    cff_outlines: bool,
}

impl FontAsset {
    /// Read and validate a font file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|err| StampError::resource(path, err))?;
        Self::from_bytes(path, data)
    }

    /// Validate an in-memory font program. `path` is used for naming and
    /// diagnostics only.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| StampError::resource(&path, format!("not a usable font: {err}")))?;

        let units_per_em = face.units_per_em();
        let scale = |value: i16| (i32::from(value) * 1000) / i32::from(units_per_em.max(1));
        let bbox = face.global_bounding_box();
        let metrics = FontMetrics {
            ascent: scale(face.ascender()),
            descent: scale(face.descender()),
            cap_height: scale(face.capital_height().unwrap_or(face.ascender())),
            italic_angle: face.italic_angle().unwrap_or(0.0),
            bbox: [
                scale(bbox.x_min),
                scale(bbox.y_min),
                scale(bbox.x_max),
                scale(bbox.y_max),
            ],
            fixed_pitch: face.is_monospaced(),
        };
        let cff_outlines = face.tables().cff.is_some();
        let postscript_name = postscript_name(&face, &path);
        drop(face);

        debug!(
            name = %postscript_name,
            units_per_em,
            cff_outlines,
            "font parsed"
        );

        Ok(Self {
            path,
            data,
            postscript_name,
            units_per_em,
            metrics,
            cff_outlines,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw font program.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// PDF-safe PostScript name.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// True for OpenType fonts with CFF outlines (embedded as FontFile3).
    pub fn has_cff_outlines(&self) -> bool {
        self.cff_outlines
    }

    /// Re-parse the face. Parsing already succeeded once, so this only fails
    /// if the bytes were somehow swapped underneath us.
    pub fn face(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0)
            .map_err(|err| StampError::Font(format!("{}: {err}", self.path.display())))
    }

    /// Glyph for `ch` plus its advance in 1000-unit glyph space. Characters
    /// the font lacks map to glyph 0 (`.notdef`).
    pub fn glyph(&self, face: &ttf_parser::Face<'_>, ch: char) -> (u16, u32) {
        let glyph = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
        let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
        let width = (u32::from(advance) * 1000) / u32::from(self.units_per_em.max(1));
        (glyph.0, width)
    }
}

fn postscript_name(face: &ttf_parser::Face<'_>, path: &Path) -> String {
    let from_table = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string());
    let from_file = || {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let cleaned: String = from_table
        .unwrap_or_else(from_file)
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

/// A font as the interpreter sees it: a standard font or a shared handle to
/// a loaded program.
#[derive(Debug, Clone)]
pub enum FontHandle {
    Standard(StandardFont),
    Embedded(Arc<FontAsset>),
}

impl FontHandle {
    /// Identity used to share one PDF font object between pages.
    pub fn key(&self) -> String {
        match self {
            Self::Standard(font) => format!("std:{}", font.base_font()),
            Self::Embedded(asset) => format!("file:{}", asset.path().display()),
        }
    }

    /// Human-readable name for logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Standard(font) => font.base_font(),
            Self::Embedded(asset) => asset.postscript_name(),
        }
    }
}

impl Default for FontHandle {
    fn default() -> Self {
        Self::Standard(StandardFont::Helvetica)
    }
}

impl PartialEq for FontHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Standard(a), Self::Standard(b)) => a == b,
            (Self::Embedded(a), Self::Embedded(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
