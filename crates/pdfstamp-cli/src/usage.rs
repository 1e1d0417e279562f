// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Usage text, generated from the command grammar.

use std::fmt::Write;

use pdfstamp_core::Grammar;

pub const PROGRAM: &str = "stamppdf";

pub fn text(grammar: &Grammar) -> String {
    let mut out = format!(
        "usage: {PROGRAM} [command...] [--] input-file [output-file]\n\n\
         Each command is -short or --long; values follow in the next argument,\n\
         separated by ':', with key=value for keywords (\\: and \\= escape).\n\
         A leading '-' on a coordinate measures it from the right or top edge.\n\
         Without an output file the input is replaced.\n\ncommands:\n"
    );

    let mut options: Vec<_> = grammar.options().iter().collect();
    options.sort_by_key(|spec| spec.opcode().long_name());
    for spec in options {
        let opcode = spec.opcode();
        let names = format!("-{}, --{}", opcode.short_name(), opcode.long_name());
        let values = match spec.arity() {
            (0, 0) => String::new(),
            (min, max) if min == max => format!("{min} value(s)"),
            (min, usize::MAX) => format!("{min}+ values"),
            (min, max) => format!("{min}-{max} values"),
        };
        let keywords: Vec<_> = spec.keyword_names().collect();
        let _ = write!(out, "  {names:<38} {values}");
        if !keywords.is_empty() {
            let _ = write!(out, "; keywords {}", keywords.join(" "));
        }
        out.push('\n');
    }

    out.push_str(
        "\nother:\n  -?, --help                             show this text\n  \
         -V, --version                          show the version\n",
    );
    out
}
