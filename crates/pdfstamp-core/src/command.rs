// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command model — the typed, immutable script the interpreter replays.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, StampError};

/// Closed set of stamping opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    Arc,
    CharSpacing,
    Circle,
    ClosePath,
    ClosePathEoFillStroke,
    ClosePathFillStroke,
    ClosePathStroke,
    Color,
    CurveFromTo,
    CurveTo,
    Ellipse,
    EndPath,
    EoFill,
    EoFillStroke,
    Fill,
    FillColor,
    FillStroke,
    FontFile,
    FontSize,
    HorizontalScaling,
    Image,
    Leading,
    LineCapStyle,
    LineDash,
    LineJoinStyle,
    LineTo,
    LineWidth,
    Literal,
    MiterLimit,
    MoveTo,
    Pages,
    Rectangle,
    RoundRectangle,
    Stroke,
    StrokeColor,
    Text,
    TextMatrix,
    TextPos,
    TextRenderingMode,
    TextRise,
    WordSpacing,
}

impl Opcode {
    /// Long command-line name (`--rectangle`).
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::CharSpacing => "char-spacing",
            Self::Circle => "circle",
            Self::ClosePath => "close-path",
            Self::ClosePathEoFillStroke => "close-path-eo-fill-stroke",
            Self::ClosePathFillStroke => "close-path-fill-stroke",
            Self::ClosePathStroke => "close-path-stroke",
            Self::Color => "color",
            Self::CurveFromTo => "curve-from-to",
            Self::CurveTo => "curve-to",
            Self::Ellipse => "ellipse",
            Self::EndPath => "end-path",
            Self::EoFill => "eo-fill",
            Self::EoFillStroke => "eo-fill-stroke",
            Self::Fill => "fill",
            Self::FillColor => "fill-color",
            Self::FillStroke => "fill-stroke",
            Self::FontFile => "font-file",
            Self::FontSize => "font-size",
            Self::HorizontalScaling => "horizontal-scaling",
            Self::Image => "image",
            Self::Leading => "leading",
            Self::LineCapStyle => "line-cap-style",
            Self::LineDash => "line-dash",
            Self::LineJoinStyle => "line-join-style",
            Self::LineTo => "line-to",
            Self::LineWidth => "line-width",
            Self::Literal => "literal",
            Self::MiterLimit => "miter-limit",
            Self::MoveTo => "move-to",
            Self::Pages => "pages",
            Self::Rectangle => "rectangle",
            Self::RoundRectangle => "round-rectangle",
            Self::Stroke => "stroke",
            Self::StrokeColor => "stroke-color",
            Self::Text => "text",
            Self::TextMatrix => "text-matrix",
            Self::TextPos => "text-pos",
            Self::TextRenderingMode => "text-rendering-mode",
            Self::TextRise => "text-rise",
            Self::WordSpacing => "word-spacing",
        }
    }

    /// Short command-line name (`-re`).
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Arc => "ar",
            Self::CharSpacing => "cs",
            Self::Circle => "ci",
            Self::ClosePath => "cp",
            Self::ClosePathEoFillStroke => "cpefs",
            Self::ClosePathFillStroke => "cpfs",
            Self::ClosePathStroke => "cps",
            Self::Color => "c",
            Self::CurveFromTo => "cft",
            Self::CurveTo => "ct",
            Self::Ellipse => "el",
            Self::EndPath => "ep",
            Self::EoFill => "ef",
            Self::EoFillStroke => "efs",
            Self::Fill => "f",
            Self::FillColor => "fc",
            Self::FillStroke => "fs",
            Self::FontFile => "ff",
            Self::FontSize => "ps",
            Self::HorizontalScaling => "hs",
            Self::Image => "i",
            Self::Leading => "le",
            Self::LineCapStyle => "lc",
            Self::LineDash => "ld",
            Self::LineJoinStyle => "lj",
            Self::LineTo => "lt",
            Self::LineWidth => "lw",
            Self::Literal => "x",
            Self::MiterLimit => "ml",
            Self::MoveTo => "mt",
            Self::Pages => "p",
            Self::Rectangle => "re",
            Self::RoundRectangle => "rr",
            Self::Stroke => "s",
            Self::StrokeColor => "sc",
            Self::Text => "t",
            Self::TextMatrix => "tm",
            Self::TextPos => "tp",
            Self::TextRenderingMode => "rm",
            Self::TextRise => "tr",
            Self::WordSpacing => "ws",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// One positional or keyword value, kept in its raw textual form.
///
/// The raw text matters: a leading `-` on a coordinate means "measured from
/// the far page edge", which `-0` must preserve even though it parses to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    raw: String,
}

impl Value {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The value exactly as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// String view.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether the raw text starts with a minus sign.
    pub fn is_negative(&self) -> bool {
        self.raw.trim_start().starts_with('-')
    }

    /// Double-precision view.
    pub fn as_f64(&self) -> Result<f64> {
        let text = self.raw.trim();
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StampError::Render(format!("invalid number format: {:?}", self.raw)))
    }

    /// Single-precision view.
    pub fn as_f32(&self) -> Result<f32> {
        self.as_f64().map(|v| v as f32)
    }

    /// Integer view.
    pub fn as_i64(&self) -> Result<i64> {
        self.raw
            .trim()
            .parse::<i64>()
            .map_err(|_| StampError::Render(format!("invalid integer format: {:?}", self.raw)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A single parsed command: opcode, positional values, keyword values.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    opcode: Opcode,
    args: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl Command {
    pub fn new(opcode: Opcode, args: Vec<Value>, keywords: BTreeMap<String, Value>) -> Self {
        Self {
            opcode,
            args,
            keywords,
        }
    }

    /// Build a command from raw positional strings, without keywords.
    pub fn positional<I, S>(opcode: Opcode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            opcode,
            args.into_iter().map(|raw| Value::new(raw)).collect(),
            BTreeMap::new(),
        )
    }

    /// Add a keyword value (builder style, mainly for tests and tooling).
    pub fn with_keyword(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keywords.insert(key.into(), Value::new(value));
        self
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Positional value at `index`, or an arity error naming the opcode.
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.args.get(index).ok_or_else(|| {
            StampError::Render(format!(
                "{}: missing parameter #{}",
                self.opcode,
                index + 1
            ))
        })
    }

    /// First `N` positional values as doubles.
    pub fn doubles<const N: usize>(&self) -> Result<[f64; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.arg(i)?.as_f64()?;
        }
        Ok(out)
    }

    pub fn keyword(&self, key: &str) -> Option<&Value> {
        self.keywords.get(key)
    }

    pub fn has_keyword(&self, key: &str) -> bool {
        self.keywords.contains_key(key)
    }

    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }
}
