// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stamppdf — stamp existing PDF documents with vector graphics, text and
// images described on the command line.
//
// Entry point. Initialises logging, loads configuration, parses the command
// line and runs the stamper. Exit status is 0 on success and 1 on any error.

mod invocation;
mod usage;

use std::process::ExitCode;

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Grammar, StampConfig};
use pdfstamp_document::Stamper;

use invocation::Invocation;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let grammar = Grammar::stamp();
    match run(&grammar) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "stamppdf failed");
            eprintln!("{}: {err}", usage::PROGRAM);
            if matches!(err, StampError::Usage(_) | StampError::Grammar(_)) {
                eprint!("{}", usage::text(&grammar));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(grammar: &Grammar) -> Result<()> {
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| StampError::Usage(format!("argument is not valid UTF-8: {arg:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    match Invocation::parse(grammar, &args)? {
        Invocation::Help => {
            print!("{}", usage::text(grammar));
            Ok(())
        }
        Invocation::Version => {
            println!("{} {}", usage::PROGRAM, env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Invocation::Stamp {
            commands,
            input,
            output,
        } => {
            let stamper = Stamper::new(StampConfig::from_env()?);
            tracing::info!(commands = commands.len(), input = %input.display(), "stamppdf starting");
            invocation::stamp(&stamper, &commands, &input, output.as_deref())
        }
    }
}
