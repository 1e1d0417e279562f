// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command grammar — the table of accepted opcodes and the sequential
// command-line parser that turns argv into an ordered list of commands.
//
// Syntax: `-re 10:10:50:50:c=ur` or `--rectangle 10:10:50:50:c=ur`. Values
// are separated by `:`; `key=value` items bind declared keywords. `\:`,
// `\=` and `\\` escape. `--` (or the first non-option argument) ends the
// command list and starts the file names.

use std::collections::BTreeMap;

use tracing::debug;

use crate::color::Rgb;
use crate::command::{Command, Opcode, Value};
use crate::error::{Result, StampError};

/// Type constraint for a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueType {
    Str,
    Color,
    Float,
    PosFloat,
    NonNegFloat,
    IntRange(i64, i64),
}

impl ValueType {
    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let number = || value.as_f64().map_err(|_| "a number".to_string());
        match *self {
            Self::Str => Ok(()),
            Self::Color => value
                .as_str()
                .parse::<Rgb>()
                .map(|_| ())
                .map_err(|_| "a color".into()),
            Self::Float => number().map(|_| ()),
            Self::PosFloat => match number()? {
                v if v > 0.0 => Ok(()),
                _ => Err("a positive number".into()),
            },
            Self::NonNegFloat => match number()? {
                v if v >= 0.0 => Ok(()),
                _ => Err("a non-negative number".into()),
            },
            Self::IntRange(lo, hi) => match value.as_i64() {
                Ok(v) if (lo..=hi).contains(&v) => Ok(()),
                _ => Err(format!("an integer in {lo}..={hi}")),
            },
        }
    }
}

/// Declaration of one opcode: names, arity and value types.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    opcode: Opcode,
    min_args: usize,
    max_args: usize,
    /// Types by position; the last entry repeats for further positions.
    positional: Vec<ValueType>,
    keywords: Vec<(&'static str, ValueType)>,
}

impl OptionSpec {
    fn new(opcode: Opcode, min_args: usize, max_args: usize) -> Self {
        Self {
            opcode,
            min_args,
            max_args,
            positional: Vec::new(),
            keywords: Vec::new(),
        }
    }

    fn flag(opcode: Opcode) -> Self {
        Self::new(opcode, 0, 0)
    }

    fn arg(mut self, kind: ValueType) -> Self {
        self.positional.push(kind);
        self
    }

    fn kw(mut self, key: &'static str, kind: ValueType) -> Self {
        self.keywords.push((key, kind));
        self
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn takes_values(&self) -> bool {
        self.max_args > 0
    }

    /// Accepted number of positional values, inclusive.
    pub fn arity(&self) -> (usize, usize) {
        (self.min_args, self.max_args)
    }

    /// Declared keyword names, in declaration order.
    pub fn keyword_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keywords.iter().map(|(key, _)| *key)
    }

    fn type_at(&self, index: usize) -> ValueType {
        self.positional
            .get(index)
            .or(self.positional.last())
            .copied()
            .unwrap_or(ValueType::Str)
    }

    fn keyword_type(&self, key: &str) -> Option<ValueType> {
        self.keywords.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
    }
}

/// Result of parsing a full command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub commands: Vec<Command>,
    pub files: Vec<String>,
}

/// Immutable table of every accepted opcode.
#[derive(Debug, Clone)]
pub struct Grammar {
    options: Vec<OptionSpec>,
}

impl Grammar {
    /// The stamping vocabulary.
    pub fn stamp() -> Self {
        use Opcode as O;
        use ValueType as T;

        let text_keywords = [
            ("cs", T::Float),
            ("fc", T::Color),
            ("ff", T::Str),
            ("hs", T::PosFloat),
            ("le", T::Float),
            ("lw", T::NonNegFloat),
            ("ps", T::PosFloat),
            ("rm", T::IntRange(0, 7)),
            ("sc", T::Color),
            ("tr", T::Float),
            ("ws", T::Float),
        ];
        let mut text = OptionSpec::new(O::Text, 1, 3).arg(T::Str).arg(T::Float);
        for (key, kind) in text_keywords {
            text = text.kw(key, kind);
        }

        let options = vec![
            OptionSpec::new(O::Arc, 6, 6).arg(T::Float),
            OptionSpec::new(O::Color, 1, 2).arg(T::Color),
            OptionSpec::new(O::CurveFromTo, 4, 4).arg(T::Float),
            OptionSpec::new(O::Circle, 3, 3).arg(T::Float).arg(T::Float).arg(T::NonNegFloat),
            OptionSpec::flag(O::ClosePath),
            OptionSpec::flag(O::ClosePathEoFillStroke),
            OptionSpec::flag(O::ClosePathFillStroke),
            OptionSpec::flag(O::ClosePathStroke),
            OptionSpec::new(O::CharSpacing, 1, 1).arg(T::Float),
            OptionSpec::new(O::CurveTo, 4, 6).arg(T::Float),
            OptionSpec::flag(O::EoFill),
            OptionSpec::flag(O::EoFillStroke),
            OptionSpec::new(O::Ellipse, 4, 4).arg(T::Float),
            OptionSpec::flag(O::EndPath),
            OptionSpec::flag(O::Fill),
            OptionSpec::new(O::FillColor, 1, 1).arg(T::Color),
            OptionSpec::new(O::FontFile, 1, 1).arg(T::Str),
            OptionSpec::flag(O::FillStroke),
            OptionSpec::new(O::HorizontalScaling, 1, 1).arg(T::PosFloat),
            OptionSpec::new(O::Image, 3, 3)
                .arg(T::Str)
                .arg(T::Float)
                .kw("w", T::NonNegFloat)
                .kw("h", T::NonNegFloat)
                .kw("c", T::Str),
            OptionSpec::new(O::LineCapStyle, 1, 1).arg(T::IntRange(0, 2)),
            OptionSpec::new(O::LineDash, 1, usize::MAX).arg(T::NonNegFloat),
            OptionSpec::new(O::Leading, 1, 1).arg(T::Float),
            OptionSpec::new(O::LineJoinStyle, 1, 1).arg(T::IntRange(0, 2)),
            OptionSpec::new(O::LineTo, 2, 2).arg(T::Float),
            OptionSpec::new(O::LineWidth, 1, 1).arg(T::NonNegFloat),
            OptionSpec::new(O::MiterLimit, 1, 1).arg(T::NonNegFloat),
            OptionSpec::new(O::MoveTo, 2, 2).arg(T::Float),
            OptionSpec::new(O::Pages, 1, usize::MAX).arg(T::Str),
            OptionSpec::new(O::FontSize, 1, 1).arg(T::PosFloat),
            OptionSpec::new(O::Rectangle, 4, 4)
                .arg(T::Float)
                .arg(T::Float)
                .arg(T::NonNegFloat)
                .kw("c", T::Str),
            OptionSpec::new(O::TextRenderingMode, 1, 1).arg(T::IntRange(0, 7)),
            OptionSpec::new(O::RoundRectangle, 5, 5)
                .arg(T::Float)
                .arg(T::Float)
                .arg(T::NonNegFloat)
                .kw("c", T::Str),
            OptionSpec::flag(O::Stroke),
            OptionSpec::new(O::StrokeColor, 1, 1).arg(T::Color),
            text,
            OptionSpec::new(O::TextMatrix, 6, 6).arg(T::Float),
            OptionSpec::new(O::TextPos, 2, 2).arg(T::Float),
            OptionSpec::new(O::TextRise, 1, 1).arg(T::Float),
            OptionSpec::new(O::WordSpacing, 1, 1).arg(T::Float),
            OptionSpec::new(O::Literal, 1, 1).arg(T::Str),
        ];

        Self { options }
    }

    /// Look up an option token (`-re`, `--rectangle`).
    pub fn lookup(&self, token: &str) -> Option<&OptionSpec> {
        if let Some(long) = token.strip_prefix("--") {
            self.options.iter().find(|o| o.opcode.long_name() == long)
        } else if let Some(short) = token.strip_prefix('-') {
            self.options.iter().find(|o| o.opcode.short_name() == short)
        } else {
            None
        }
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Parse a command line (program name excluded).
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<ParsedLine> {
        let mut commands = Vec::new();
        let mut index = 0;

        while index < args.len() {
            let token = args[index].as_ref();
            if token == "--" {
                index += 1;
                break;
            }
            if !token.starts_with('-') || token == "-" {
                break;
            }
            let spec = self
                .lookup(token)
                .ok_or_else(|| StampError::Grammar(format!("unknown command {token:?}")))?;
            index += 1;

            let command = if spec.takes_values() {
                let values = args.get(index).map(AsRef::as_ref).ok_or_else(|| {
                    StampError::Grammar(format!("{}: missing parameters", spec.opcode))
                })?;
                index += 1;
                build_command(spec, values)?
            } else {
                Command::new(spec.opcode, Vec::new(), BTreeMap::new())
            };
            debug!(opcode = %command.opcode(), args = command.arg_count(), "command parsed");
            commands.push(command);
        }

        let files = args[index..].iter().map(|s| s.as_ref().to_string()).collect();
        Ok(ParsedLine { commands, files })
    }
}

fn build_command(spec: &OptionSpec, values: &str) -> Result<Command> {
    let opcode = spec.opcode;
    let mut args = Vec::new();
    let mut keywords = BTreeMap::new();

    for item in split_escaped(values) {
        let keyword = item
            .eq_at
            .map(|at| (&item.text[..at], &item.text[at + 1..]))
            .and_then(|(key, value)| spec.keyword_type(key).map(|kind| (key, value, kind)));

        match keyword {
            Some((key, value, kind)) => {
                let value = Value::new(value);
                kind.check(&value).map_err(|expected| {
                    StampError::Grammar(format!(
                        "{opcode}: keyword {key} must be {expected}, got {:?}",
                        value.raw()
                    ))
                })?;
                if keywords.insert(key.to_string(), value).is_some() {
                    return Err(StampError::Grammar(format!(
                        "{opcode}: keyword {key} given twice"
                    )));
                }
            }
            None => args.push(Value::new(item.text)),
        }
    }

    if args.len() < spec.min_args || args.len() > spec.max_args {
        let expected = if spec.min_args == spec.max_args {
            spec.min_args.to_string()
        } else if spec.max_args == usize::MAX {
            format!("at least {}", spec.min_args)
        } else {
            format!("{} to {}", spec.min_args, spec.max_args)
        };
        return Err(StampError::Grammar(format!(
            "{opcode}: expected {expected} parameters, got {}",
            args.len()
        )));
    }

    for (position, value) in args.iter().enumerate() {
        spec.type_at(position).check(value).map_err(|expected| {
            StampError::Grammar(format!(
                "{opcode}: parameter #{} must be {expected}, got {:?}",
                position + 1,
                value.raw()
            ))
        })?;
    }

    Ok(Command::new(opcode, args, keywords))
}

/// One `:`-separated item with the position of its first unescaped `=`.
struct Item {
    text: String,
    eq_at: Option<usize>,
}

fn split_escaped(values: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = Item {
        text: String::new(),
        eq_at: None,
    };
    let mut chars = values.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => current.text.push(escaped),
                None => current.text.push('\\'),
            },
            ':' => {
                items.push(std::mem::replace(
                    &mut current,
                    Item {
                        text: String::new(),
                        eq_at: None,
                    },
                ));
            }
            '=' => {
                if current.eq_at.is_none() {
                    current.eq_at = Some(current.text.len());
                }
                current.text.push('=');
            }
            other => current.text.push(other),
        }
    }
    items.push(current);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParsedLine> {
        Grammar::stamp().parse(args)
    }

    #[test]
    fn short_and_long_names_resolve_to_the_same_opcode() {
        let grammar = Grammar::stamp();
        assert_eq!(grammar.lookup("-re").map(OptionSpec::opcode), Some(Opcode::Rectangle));
        assert_eq!(
            grammar.lookup("--rectangle").map(OptionSpec::opcode),
            Some(Opcode::Rectangle)
        );
        assert!(grammar.lookup("rectangle").is_none());
    }

    #[test]
    fn every_opcode_is_declared_once() {
        let grammar = Grammar::stamp();
        let mut seen: Vec<Opcode> = grammar.options().iter().map(OptionSpec::opcode).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, 41);
    }

    #[test]
    fn commands_keep_script_order_and_files_follow() {
        let line = parse(&["-p", "2", "-re", "10:10:50:50", "-f", "in.pdf", "out.pdf"]).unwrap();
        let opcodes: Vec<Opcode> = line.commands.iter().map(Command::opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Pages, Opcode::Rectangle, Opcode::Fill]);
        assert_eq!(line.files, vec!["in.pdf", "out.pdf"]);
    }

    #[test]
    fn negative_coordinates_are_values_not_options() {
        let line = parse(&["-re", "-5:-0:20:20:c=ur", "--", "-odd-name.pdf"]).unwrap();
        let cmd = &line.commands[0];
        assert_eq!(cmd.arg(0).unwrap().raw(), "-5");
        assert_eq!(cmd.arg(1).unwrap().raw(), "-0");
        assert_eq!(cmd.keyword("c").map(Value::as_str), Some("ur"));
        assert_eq!(line.files, vec!["-odd-name.pdf"]);
    }

    #[test]
    fn text_keywords_and_escapes() {
        let line = parse(&["-t", r"Time\: {page}:10:-20:ps=12:fc=red:a\=b=c", "in.pdf"]);
        // `a=b=c` is not a declared keyword, so it is a fourth positional.
        assert!(line.is_err());

        let line = parse(&["-t", r"Time\: 12\=00:10:-20:ps=12:fc=red", "in.pdf"]).unwrap();
        let cmd = &line.commands[0];
        assert_eq!(cmd.arg(0).unwrap().as_str(), "Time: 12=00");
        assert_eq!(cmd.arg_count(), 3);
        assert_eq!(cmd.keyword("ps").map(Value::as_str), Some("12"));
        assert_eq!(cmd.keyword("fc").map(Value::as_str), Some("red"));
    }

    #[test]
    fn arity_and_types_are_checked() {
        assert!(matches!(parse(&["-mt", "1", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-mt", "1:a", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-lw", "-1", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-rm", "8", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-fc", "blurple", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-ps", "0", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-re", "1:2:3:4:c=ur:c=ll", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-bogus", "x.pdf"]), Err(StampError::Grammar(_))));
        assert!(matches!(parse(&["-mt"]), Err(StampError::Grammar(_))));
    }

    #[test]
    fn repeating_types_cover_variadic_options() {
        let line = parse(&["-ld", "3:2:1:0", "-p", "1:3-:-2", "x.pdf"]).unwrap();
        assert_eq!(line.commands[0].arg_count(), 4);
        assert_eq!(line.commands[1].arg_count(), 3);
    }

    #[test]
    fn empty_literal_passes_grammar() {
        let line = parse(&["-x", "", "x.pdf"]).unwrap();
        assert_eq!(line.commands[0].arg(0).unwrap().raw(), "");
    }
}
