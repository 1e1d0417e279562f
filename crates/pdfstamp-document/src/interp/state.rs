// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render state — the persistent per-page attributes, and the one-command
// overlay `text` derives from them.

use pdfstamp_core::error::Result;
use pdfstamp_core::{Command, RenderDefaults, Rgb};

use super::preload::ResourceCache;
use super::surface::DrawingSurface;
use crate::assets::FontHandle;

/// Persistent attributes, reset at the start of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub font: FontHandle,
    pub font_size: f64,
    pub leading: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub text_rise: f64,
    pub rendering_mode: i64,
    pub horizontal_scaling: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub line_width: f64,
}

impl RenderState {
    /// The initial state of a page.
    pub fn from_defaults(defaults: &RenderDefaults, font: FontHandle) -> Result<Self> {
        Ok(Self {
            font,
            font_size: f64::from(defaults.font_size),
            leading: f64::from(defaults.leading),
            char_spacing: f64::from(defaults.character_spacing),
            word_spacing: f64::from(defaults.word_spacing),
            text_rise: f64::from(defaults.text_rise),
            rendering_mode: defaults.rendering_mode,
            horizontal_scaling: f64::from(defaults.horizontal_scaling),
            fill: defaults.fill_color.parse()?,
            stroke: defaults.stroke_color.parse()?,
            line_width: f64::from(defaults.line_width),
        })
    }
}

/// Attributes in force for a single `text` command: the persistent state
/// with that command's keywords laid over it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub font: FontHandle,
    pub font_size: f64,
    pub leading: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub text_rise: f64,
    pub rendering_mode: i64,
    pub horizontal_scaling: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub line_width: f64,
}

impl TextOverlay {
    pub fn compose(state: &RenderState, command: &Command, cache: &ResourceCache) -> Result<Self> {
        let float = |key: &str, base: f64| -> Result<f64> {
            command.keyword(key).map_or(Ok(base), |v| v.as_f64())
        };
        let color = |key: &str, base: Rgb| -> Result<Rgb> {
            command.keyword(key).map_or(Ok(base), |v| v.as_str().parse())
        };

        let font = match command.keyword("ff") {
            Some(name) => cache.font(name.as_str())?.clone(),
            None => state.font.clone(),
        };

        Ok(Self {
            font,
            font_size: float("ps", state.font_size)?,
            leading: float("le", state.leading)?,
            char_spacing: float("cs", state.char_spacing)?,
            word_spacing: float("ws", state.word_spacing)?,
            text_rise: float("tr", state.text_rise)?,
            rendering_mode: command
                .keyword("rm")
                .map_or(Ok(state.rendering_mode), |v| v.as_i64())?,
            horizontal_scaling: float("hs", state.horizontal_scaling)?,
            fill: color("fc", state.fill)?,
            stroke: color("sc", state.stroke)?,
            line_width: float("lw", state.line_width)?,
        })
    }

    /// Emit every attribute, whether or not it changed.
    pub fn apply(&self, surface: &mut dyn DrawingSurface) {
        surface.set_fill_color(self.fill);
        surface.set_stroke_color(self.stroke);
        surface.set_line_width(self.line_width);
        surface.set_font(&self.font, self.font_size);
        surface.set_leading(self.leading);
        surface.set_char_spacing(self.char_spacing);
        surface.set_word_spacing(self.word_spacing);
        surface.set_text_rise(self.text_rise);
        surface.set_rendering_mode(self.rendering_mode);
        surface.set_horizontal_scaling(self.horizontal_scaling);
    }

    /// Put back the persistent graphics attributes this overlay changed.
    pub fn restore(&self, state: &RenderState, surface: &mut dyn DrawingSurface) {
        if self.fill != state.fill {
            surface.set_fill_color(state.fill);
        }
        if self.stroke != state.stroke {
            surface.set_stroke_color(state.stroke);
        }
        if self.line_width != state.line_width {
            surface.set_line_width(state.line_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StandardFont;
    use crate::interp::preload::tests::CountingLoader;
    use pdfstamp_core::Opcode;

    fn state() -> RenderState {
        RenderState::from_defaults(&RenderDefaults::default(), FontHandle::default()).unwrap()
    }

    #[test]
    fn defaults_become_the_initial_state() {
        let state = state();
        assert_eq!(state.font_size, 9.0);
        assert_eq!(state.leading, 11.0);
        assert_eq!(state.horizontal_scaling, 100.0);
        assert_eq!(state.fill, Rgb::BLACK);
        assert_eq!(state.line_width, 1.0);
    }

    #[test]
    fn bad_default_colors_are_reported() {
        let defaults = RenderDefaults {
            fill_color: "not-a-color".into(),
            ..RenderDefaults::default()
        };
        assert!(RenderState::from_defaults(&defaults, FontHandle::default()).is_err());
    }

    #[test]
    fn keywords_override_only_what_they_name() {
        let command = Command::positional(Opcode::Text, ["x"])
            .with_keyword("ps", "20")
            .with_keyword("fc", "red")
            .with_keyword("le", "30")
            .with_keyword("ff", "Courier");
        let cache = ResourceCache::preload(
            std::slice::from_ref(&command),
            &CountingLoader::default(),
            None,
        )
        .unwrap();
        let base = state();
        let overlay = TextOverlay::compose(&base, &command, &cache).unwrap();

        assert_eq!(overlay.font_size, 20.0);
        assert_eq!(overlay.leading, 30.0);
        assert_eq!(overlay.fill, Rgb::from_bytes(255, 0, 0));
        assert_eq!(overlay.font, FontHandle::Standard(StandardFont::Courier));
        assert_eq!(overlay.stroke, base.stroke);
        assert_eq!(overlay.char_spacing, base.char_spacing);
        // The persistent state is untouched.
        assert_eq!(base.font_size, 9.0);
        assert_eq!(base.font, FontHandle::default());
    }

    #[test]
    fn unknown_overlay_font_is_an_error() {
        let command = Command::positional(Opcode::Text, ["x"]).with_keyword("ff", "Courier");
        let cache = ResourceCache::preload(&[], &CountingLoader::default(), None).unwrap();
        assert!(TextOverlay::compose(&state(), &command, &cache).is_err());
    }
}
