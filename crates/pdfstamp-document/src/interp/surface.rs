// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawing surface — the primitive page operations the executor replays
// commands onto. Implemented over a PDF page by `pdf::PageCanvas`; tests use
// a recording implementation.

use pdfstamp_core::Rgb;
use pdfstamp_core::error::Result;

use crate::assets::{FontHandle, ImageAsset};

/// Path-painting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Fill,
    EoFill,
    Stroke,
    FillStroke,
    EoFillStroke,
    ClosePathStroke,
    ClosePathFillStroke,
    ClosePathEoFillStroke,
    EndPath,
}

impl Paint {
    /// PDF content-stream operator.
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Fill => "f",
            Self::EoFill => "f*",
            Self::Stroke => "S",
            Self::FillStroke => "B",
            Self::EoFillStroke => "B*",
            Self::ClosePathStroke => "s",
            Self::ClosePathFillStroke => "b",
            Self::ClosePathEoFillStroke => "b*",
            Self::EndPath => "n",
        }
    }
}

/// A page's drawing surface.
pub trait DrawingSurface {
    // -- Path construction --
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Cubic Bézier with both control points (`c`).
    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64);
    /// Bézier whose first control point is the current point (`v`).
    fn curve_to_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64);
    /// Bézier whose second control point is the end point (`y`).
    fn curve_to_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64);
    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn close_path(&mut self);
    fn paint(&mut self, paint: Paint);

    // -- Graphics state --
    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_stroke_color(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, style: i64);
    fn set_line_join(&mut self, style: i64);
    fn set_miter_limit(&mut self, limit: f64);
    fn set_dash(&mut self, pattern: &[f64], phase: f64);

    // -- Text --
    fn begin_text(&mut self);
    fn end_text(&mut self);
    fn set_font(&mut self, font: &FontHandle, size: f64);
    fn set_leading(&mut self, leading: f64);
    fn set_char_spacing(&mut self, spacing: f64);
    fn set_word_spacing(&mut self, spacing: f64);
    fn set_text_rise(&mut self, rise: f64);
    fn set_rendering_mode(&mut self, mode: i64);
    fn set_horizontal_scaling(&mut self, percent: f64);
    fn set_text_matrix(&mut self, matrix: [f64; 6]);
    /// Show `text` in the current font at the current text position.
    fn show_text(&mut self, text: &str) -> Result<()>;
    /// Move to the start of the next line, one leading down.
    fn next_line(&mut self);

    // -- XObjects and raw content --
    /// Paint `image` into the box with lower-left corner (`x`, `y`).
    fn draw_image(&mut self, image: &ImageAsset, x: f64, y: f64, width: f64, height: f64);
    /// Inject raw content-stream text.
    fn write_literal(&mut self, content: &str);
}
