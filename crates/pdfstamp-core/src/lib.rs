// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfstamp — Command model, grammar, configuration and errors shared by all
// crates.

pub mod color;
pub mod command;
pub mod config;
pub mod error;
pub mod grammar;

pub use color::Rgb;
pub use command::{Command, Opcode, Value};
pub use config::{RenderDefaults, StampConfig, StampLayer};
pub use error::{Result, StampError};
pub use grammar::{Grammar, ParsedLine};
