// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas — a `DrawingSurface` that records lopdf content operations for
// one page and registers the fonts and images they reference.

use lopdf::Object;
use lopdf::content::Operation;
use pdfstamp_core::Rgb;
use pdfstamp_core::error::{Result, StampError};

use super::writer::{PageStamp, PdfWriter};
use crate::assets::{FontHandle, ImageAsset};
use crate::interp::surface::{DrawingSurface, Paint};

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color
        .components()
        .into_iter()
        .map(|c| real(f64::from(c)))
        .collect()
}

fn reals<const N: usize>(values: [f64; N]) -> Vec<Object> {
    values.into_iter().map(real).collect()
}

/// Content operations for one page, drawn against a shared [`PdfWriter`].
pub struct PageCanvas<'w> {
    writer: &'w mut PdfWriter,
    stamp: PageStamp,
    font: Option<FontHandle>,
}

impl<'w> PageCanvas<'w> {
    pub fn new(writer: &'w mut PdfWriter) -> Self {
        Self {
            writer,
            stamp: PageStamp::default(),
            font: None,
        }
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> &[Operation] {
        &self.stamp.operations
    }

    /// Hand the recorded page stamp back for attaching.
    pub fn finish(self) -> PageStamp {
        self.stamp
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.stamp.operations.push(Operation::new(operator, operands));
    }
}

impl DrawingSurface for PageCanvas<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        self.push("m", reals([x, y]));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push("l", reals([x, y]));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.push("c", reals([x1, y1, x2, y2, x3, y3]));
    }

    fn curve_to_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.push("v", reals([x2, y2, x3, y3]));
    }

    fn curve_to_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.push("y", reals([x1, y1, x3, y3]));
    }

    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push("re", reals([x, y, width, height]));
    }

    fn close_path(&mut self) {
        self.push("h", vec![]);
    }

    fn paint(&mut self, paint: Paint) {
        self.push(paint.operator(), vec![]);
    }

    fn save_state(&mut self) {
        self.push("q", vec![]);
    }

    fn restore_state(&mut self) {
        self.push("Q", vec![]);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.push("rg", color_operands(color));
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.push("RG", color_operands(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push("w", vec![real(width)]);
    }

    fn set_line_cap(&mut self, style: i64) {
        self.push("J", vec![Object::Integer(style)]);
    }

    fn set_line_join(&mut self, style: i64) {
        self.push("j", vec![Object::Integer(style)]);
    }

    fn set_miter_limit(&mut self, limit: f64) {
        self.push("M", vec![real(limit)]);
    }

    fn set_dash(&mut self, pattern: &[f64], phase: f64) {
        let array = pattern.iter().copied().map(real).collect();
        self.push("d", vec![Object::Array(array), real(phase)]);
    }

    fn begin_text(&mut self) {
        self.push("BT", vec![]);
    }

    fn end_text(&mut self) {
        self.push("ET", vec![]);
    }

    fn set_font(&mut self, font: &FontHandle, size: f64) {
        let (name, id) = self.writer.font_resource(font);
        self.push("Tf", vec![Object::Name(name.as_bytes().to_vec()), real(size)]);
        self.stamp.fonts.insert(name, id);
        self.font = Some(font.clone());
    }

    fn set_leading(&mut self, leading: f64) {
        self.push("TL", vec![real(leading)]);
    }

    fn set_char_spacing(&mut self, spacing: f64) {
        self.push("Tc", vec![real(spacing)]);
    }

    fn set_word_spacing(&mut self, spacing: f64) {
        self.push("Tw", vec![real(spacing)]);
    }

    fn set_text_rise(&mut self, rise: f64) {
        self.push("Ts", vec![real(rise)]);
    }

    fn set_rendering_mode(&mut self, mode: i64) {
        self.push("Tr", vec![Object::Integer(mode)]);
    }

    fn set_horizontal_scaling(&mut self, percent: f64) {
        self.push("Tz", vec![real(percent)]);
    }

    fn set_text_matrix(&mut self, matrix: [f64; 6]) {
        self.push("Tm", reals(matrix));
    }

    fn show_text(&mut self, text: &str) -> Result<()> {
        let font = self
            .font
            .clone()
            .ok_or_else(|| StampError::Render("text shown before a font was selected".into()))?;
        let operand = self.writer.encode_text(&font, text)?;
        self.push("Tj", vec![operand]);
        Ok(())
    }

    fn next_line(&mut self) {
        self.push("T*", vec![]);
    }

    fn draw_image(&mut self, image: &ImageAsset, x: f64, y: f64, width: f64, height: f64) {
        let (name, id) = self.writer.image_resource(image);
        self.push("q", vec![]);
        self.push("cm", reals([width, 0.0, 0.0, height, x, y]));
        self.push("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.push("Q", vec![]);
        self.stamp.xobjects.insert(name, id);
    }

    fn write_literal(&mut self, content: &str) {
        // An operand-less operation is written as its operator text alone.
        self.push(content, vec![]);
    }
}
