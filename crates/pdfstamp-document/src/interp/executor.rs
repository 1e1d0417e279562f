// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page executor — the second pass. Replays one page's command queue
// against its drawing surface, starting from a fresh render state.

use std::path::Path;

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Command, Opcode, RenderDefaults, Rgb};
use tracing::{debug, instrument};

use super::coords::{Corner, PageBox};
use super::preload::ResourceCache;
use super::shapes;
use super::state::{RenderState, TextOverlay};
use super::surface::{DrawingSurface, Paint};

/// What the executor knows about the page it is drawing on.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// 1-indexed.
    pub page_number: usize,
    pub page_count: usize,
    pub page: PageBox,
    /// Input path as given on the command line.
    pub pathname: &'a str,
}

impl PageContext<'_> {
    /// Substitute `{page}`, `{pages}`, `{pathname}` and `{filename}`.
    pub fn expand(&self, text: &str) -> String {
        let filename = Path::new(self.pathname)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.pathname);
        text.replace("{page}", &self.page_number.to_string())
            .replace("{pages}", &self.page_count.to_string())
            .replace("{pathname}", self.pathname)
            .replace("{filename}", filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Text,
}

/// Interprets one page's queue.
pub struct PageExecutor<'s, 'a> {
    surface: &'s mut dyn DrawingSurface,
    cache: &'a ResourceCache,
    context: PageContext<'a>,
    state: RenderState,
    mode: Mode,
}

impl<'s, 'a> PageExecutor<'s, 'a> {
    pub fn new(
        surface: &'s mut dyn DrawingSurface,
        cache: &'a ResourceCache,
        context: PageContext<'a>,
        defaults: &RenderDefaults,
    ) -> Result<Self> {
        let state = RenderState::from_defaults(defaults, cache.default_font().clone())?;
        Ok(Self {
            surface,
            cache,
            context,
            state,
            mode: Mode::Idle,
        })
    }

    /// Replay `commands` inside a saved graphics state, closing any open
    /// text block at the end.
    #[instrument(skip_all, fields(page = self.context.page_number, commands = commands.len()))]
    pub fn run(mut self, commands: &[Command]) -> Result<()> {
        self.surface.save_state();
        self.surface.set_fill_color(self.state.fill);
        self.surface.set_stroke_color(self.state.stroke);
        self.surface.set_line_width(self.state.line_width);

        for command in commands {
            debug!(opcode = %command.opcode(), "executing");
            self.execute(command)?;
        }

        if self.mode == Mode::Text {
            self.surface.end_text();
        }
        self.surface.restore_state();
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<()> {
        match command.opcode() {
            // Consumed by the page selector.
            Opcode::Pages => {}

            // Persistent state.
            Opcode::FontFile => {
                self.state.font = self.cache.font(command.arg(0)?.as_str())?.clone();
            }
            Opcode::FontSize => self.state.font_size = command.arg(0)?.as_f64()?,
            Opcode::Leading => self.state.leading = command.arg(0)?.as_f64()?,
            Opcode::CharSpacing => self.state.char_spacing = command.arg(0)?.as_f64()?,
            Opcode::WordSpacing => self.state.word_spacing = command.arg(0)?.as_f64()?,
            Opcode::TextRise => self.state.text_rise = command.arg(0)?.as_f64()?,
            Opcode::TextRenderingMode => self.state.rendering_mode = command.arg(0)?.as_i64()?,
            Opcode::HorizontalScaling => {
                self.state.horizontal_scaling = command.arg(0)?.as_f64()?;
            }
            Opcode::LineWidth => {
                self.state.line_width = command.arg(0)?.as_f64()?;
                self.surface.set_line_width(self.state.line_width);
            }
            Opcode::FillColor => {
                self.state.fill = color(command, 0)?;
                self.surface.set_fill_color(self.state.fill);
            }
            Opcode::StrokeColor => {
                self.state.stroke = color(command, 0)?;
                self.surface.set_stroke_color(self.state.stroke);
            }
            Opcode::Color => {
                self.state.fill = color(command, 0)?;
                self.surface.set_fill_color(self.state.fill);
                self.state.stroke = color(command, command.arg_count().saturating_sub(1))?;
                self.surface.set_stroke_color(self.state.stroke);
            }

            // Graphics state outside the render state.
            Opcode::LineCapStyle => self.surface.set_line_cap(command.arg(0)?.as_i64()?),
            Opcode::LineJoinStyle => self.surface.set_line_join(command.arg(0)?.as_i64()?),
            Opcode::MiterLimit => self.surface.set_miter_limit(command.arg(0)?.as_f64()?),
            Opcode::LineDash => {
                let values = command
                    .args()
                    .iter()
                    .map(|v| v.as_f64())
                    .collect::<Result<Vec<_>>>()?;
                let (phase, pattern) = values
                    .split_last()
                    .ok_or_else(|| StampError::Render("line-dash: missing phase".into()))?;
                self.surface.set_dash(pattern, *phase);
            }

            // Path construction.
            Opcode::MoveTo => {
                let (x, y) = self.point(command, 0)?;
                self.surface.move_to(x, y);
            }
            Opcode::LineTo => {
                let (x, y) = self.point(command, 0)?;
                self.surface.line_to(x, y);
            }
            Opcode::CurveTo => match command.arg_count() {
                4 => {
                    let (x2, y2) = self.point(command, 0)?;
                    let (x3, y3) = self.point(command, 2)?;
                    self.surface.curve_to_v(x2, y2, x3, y3);
                }
                6 => {
                    let (x1, y1) = self.point(command, 0)?;
                    let (x2, y2) = self.point(command, 2)?;
                    let (x3, y3) = self.point(command, 4)?;
                    self.surface.curve_to(x1, y1, x2, y2, x3, y3);
                }
                n => {
                    return Err(StampError::Render(format!(
                        "curve-to: expected 4 or 6 parameters, got {n}"
                    )));
                }
            },
            Opcode::CurveFromTo => {
                let (x1, y1) = self.point(command, 0)?;
                let (x3, y3) = self.point(command, 2)?;
                self.surface.curve_to_y(x1, y1, x3, y3);
            }
            Opcode::Arc => {
                let (x1, y1) = self.point(command, 0)?;
                let (x2, y2) = self.point(command, 2)?;
                let start = command.arg(4)?.as_f64()?;
                let extent = command.arg(5)?.as_f64()?;
                shapes::replay(&shapes::arc(x1, y1, x2, y2, start, extent), self.surface);
            }
            Opcode::Circle => {
                let (x, y) = self.point(command, 0)?;
                let radius = command.arg(2)?.as_f64()?;
                shapes::replay(&shapes::circle(x, y, radius), self.surface);
            }
            Opcode::Ellipse => {
                let (x1, y1) = self.point(command, 0)?;
                let (x2, y2) = self.point(command, 2)?;
                shapes::replay(&shapes::ellipse(x1, y1, x2, y2), self.surface);
            }
            Opcode::Rectangle => {
                let (x, y, width, height) = self.anchored_box(command)?;
                self.surface.rectangle(x, y, width, height);
            }
            Opcode::RoundRectangle => {
                let (x, y, width, height) = self.anchored_box(command)?;
                let radius = command.arg(4)?.as_f64()?;
                shapes::replay(
                    &shapes::round_rectangle(x, y, width, height, radius),
                    self.surface,
                );
            }
            Opcode::ClosePath => self.surface.close_path(),

            // Painting.
            Opcode::Fill => self.surface.paint(Paint::Fill),
            Opcode::EoFill => self.surface.paint(Paint::EoFill),
            Opcode::Stroke => self.surface.paint(Paint::Stroke),
            Opcode::FillStroke => self.surface.paint(Paint::FillStroke),
            Opcode::EoFillStroke => self.surface.paint(Paint::EoFillStroke),
            Opcode::ClosePathStroke => self.surface.paint(Paint::ClosePathStroke),
            Opcode::ClosePathFillStroke => self.surface.paint(Paint::ClosePathFillStroke),
            Opcode::ClosePathEoFillStroke => self.surface.paint(Paint::ClosePathEoFillStroke),
            Opcode::EndPath => self.surface.paint(Paint::EndPath),

            // Text.
            Opcode::Text => self.text(command)?,
            Opcode::TextMatrix => {
                self.begin_text();
                self.surface.set_text_matrix(command.doubles::<6>()?);
            }
            Opcode::TextPos => {
                self.begin_text();
                let (x, y) = self.point(command, 0)?;
                self.surface.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
            }

            Opcode::Image => self.image(command)?,
            Opcode::Literal => {
                let content = command.arg(0)?.as_str();
                if content.is_empty() {
                    return Err(StampError::Render("empty literal".into()));
                }
                self.surface.write_literal(content);
            }
        }
        Ok(())
    }

    fn begin_text(&mut self) {
        if self.mode == Mode::Idle {
            self.surface.begin_text();
            self.mode = Mode::Text;
        }
    }

    fn point(&self, command: &Command, index: usize) -> Result<(f64, f64)> {
        self.context
            .page
            .point(command.arg(index)?, command.arg(index + 1)?)
    }

    /// `x:y:w:h` with the corner keyword, as a lower-left anchored box.
    fn anchored_box(&self, command: &Command) -> Result<(f64, f64, f64, f64)> {
        let (x, y) = self.point(command, 0)?;
        let width = command.arg(2)?.as_f64()?;
        let height = command.arg(3)?.as_f64()?;
        let corner = Corner::from_keyword(command.keyword("c"))?;
        let (x, y) = corner.lower_left(x, y, width, height);
        Ok((x, y, width, height))
    }

    fn text(&mut self, command: &Command) -> Result<()> {
        let position = match command.arg_count() {
            1 => None,
            3 => Some(self.point(command, 1)?),
            n => {
                return Err(StampError::Render(format!(
                    "text: expected 1 or 3 parameters, got {n}"
                )));
            }
        };

        self.begin_text();
        let overlay = TextOverlay::compose(&self.state, command, self.cache)?;
        overlay.apply(self.surface);
        if let Some((x, y)) = position {
            self.surface.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        }

        let raw = command.arg(0)?.as_str();
        if !raw.is_empty() {
            let text = self.context.expand(raw);
            let lines: Vec<&str> = text.split('^').collect();
            let keep = lines.iter().rposition(|line| !line.is_empty()).map_or(0, |i| i + 1);
            for (index, line) in lines[..keep].iter().enumerate() {
                if index > 0 {
                    self.surface.next_line();
                }
                self.surface.show_text(line)?;
            }
        }

        overlay.restore(&self.state, self.surface);
        Ok(())
    }

    fn image(&mut self, command: &Command) -> Result<()> {
        let image = self.cache.image(command.arg(0)?.as_str())?;
        let (natural_width, natural_height) = image.natural_size();
        let requested = |key: &str| -> Result<Option<f64>> {
            match command.keyword(key) {
                Some(value) => Ok(Some(value.as_f64()?).filter(|v| *v > 0.0)),
                None => Ok(None),
            }
        };

        let (width, height) = match (requested("w")?, requested("h")?) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, natural_height * w / natural_width),
            (None, Some(h)) => (natural_width * h / natural_height, h),
            (None, None) => (natural_width, natural_height),
        };

        let (x, y) = self.point(command, 1)?;
        let corner = Corner::from_keyword(command.keyword("c"))?;
        let (x, y) = corner.lower_left(x, y, width, height);
        self.surface.draw_image(image, x, y, width, height);
        Ok(())
    }
}

fn color(command: &Command, index: usize) -> Result<Rgb> {
    command.arg(index)?.as_str().parse()
}
