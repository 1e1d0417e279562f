// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line invocation — what the user asked for, and carrying it out.

use std::path::{Path, PathBuf};

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Command, Grammar};
use pdfstamp_document::Stamper;
use tracing::{info, instrument, warn};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Version,
    Stamp {
        commands: Vec<Command>,
        input: PathBuf,
        /// `None` edits the input in place.
        output: Option<PathBuf>,
    },
}

impl Invocation {
    /// Interpret `args` (program name excluded).
    pub fn parse(grammar: &Grammar, args: &[String]) -> Result<Self> {
        let first = args
            .first()
            .ok_or_else(|| StampError::Usage("no arguments given".into()))?;
        match first.as_str() {
            "-?" | "--help" => return Ok(Self::Help),
            "-V" | "--version" => return Ok(Self::Version),
            _ => {}
        }

        let line = grammar.parse(args)?;
        let mut files = line.files.into_iter().map(PathBuf::from);
        let (input, output) = match (files.next(), files.next(), files.next()) {
            (Some(input), output, None) => (input, output),
            _ => {
                return Err(StampError::Usage(
                    "expected an input file and an optional output file".into(),
                ));
            }
        };

        Ok(Self::Stamp {
            commands: line.commands,
            input,
            output,
        })
    }
}

/// Stamp `input` into `output`, or over `input` itself through a temporary
/// copy.
#[instrument(skip(stamper, commands), fields(commands = commands.len()))]
pub fn stamp(
    stamper: &Stamper,
    commands: &[Command],
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let pathname = input.to_string_lossy();
    if let Some(output) = output {
        return stamper.stamp_file(commands, input, output, &pathname);
    }

    let copy = tempfile::Builder::new()
        .prefix("stamppdf-")
        .suffix(".pdf")
        .tempfile()?
        .into_temp_path()
        .keep()
        .map_err(|err| StampError::Io(err.error))?;
    std::fs::copy(input, &copy).map_err(|err| StampError::resource(input, err))?;
    info!(copy = %copy.display(), "editing in place through a temporary copy");

    match stamper.stamp_file(commands, &copy, input, &pathname) {
        Ok(()) => {
            std::fs::remove_file(&copy)?;
            Ok(())
        }
        Err(err) => {
            warn!(copy = %copy.display(), "temporary copy left behind");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfstamp_core::Opcode;

    fn parse(args: &[&str]) -> Result<Invocation> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Invocation::parse(&Grammar::stamp(), &args)
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["-?"]).unwrap(), Invocation::Help);
        assert_eq!(parse(&["--help", "-zz"]).unwrap(), Invocation::Help);
        assert_eq!(parse(&["-V"]).unwrap(), Invocation::Version);
        assert_eq!(parse(&["--version"]).unwrap(), Invocation::Version);
    }

    #[test]
    fn input_and_optional_output() {
        match parse(&["-f", "in.pdf", "out.pdf"]).unwrap() {
            Invocation::Stamp {
                commands,
                input,
                output,
            } => {
                assert_eq!(commands.len(), 1);
                assert_eq!(commands[0].opcode(), Opcode::Fill);
                assert_eq!(input, PathBuf::from("in.pdf"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
            }
            other => panic!("unexpected {other:?}"),
        }

        match parse(&["--", "in.pdf"]).unwrap() {
            Invocation::Stamp { output, .. } => assert!(output.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn file_count_is_checked() {
        assert!(matches!(parse(&[]), Err(StampError::Usage(_))));
        assert!(matches!(parse(&["-f"]), Err(StampError::Usage(_))));
        assert!(matches!(parse(&["a.pdf", "b.pdf", "c.pdf"]), Err(StampError::Usage(_))));
    }

    #[test]
    fn grammar_errors_pass_through() {
        assert!(matches!(parse(&["-nope", "in.pdf"]), Err(StampError::Grammar(_))));
    }

    #[test]
    fn in_place_failure_leaves_the_input_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"not a pdf").unwrap();

        let result = stamp(&Stamper::default(), &[], &input, None);
        assert!(result.is_err());
        assert_eq!(std::fs::read(&input).unwrap(), b"not a pdf");
    }
}
