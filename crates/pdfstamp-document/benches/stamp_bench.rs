// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the interpreter's pass-1 hot paths: splitting a
// script into page queues and resolving page-relative coordinates.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pdfstamp_core::{Command, Opcode, Value};
use pdfstamp_document::PageQueues;
use pdfstamp_document::interp::coords::PageBox;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Partition a 200-command script over a 500-page document.
///
/// Every tenth command switches the selection between an open range, a
/// closed range and a scattered list of single pages, so each command is
/// copied into many queues.
fn bench_partition(c: &mut Criterion) {
    let selectors = [vec!["100-"], vec!["-250"], vec!["1", "7", "42", "300-320"]];
    let script: Vec<Command> = (0..200)
        .map(|i| {
            if i % 10 == 0 {
                Command::positional(Opcode::Pages, selectors[(i / 10) % 3].iter().copied())
            } else {
                Command::positional(Opcode::Rectangle, ["-10", "10", "50", "50"])
            }
        })
        .collect();

    c.bench_function("partition (200 commands, 500 pages)", |b| {
        b.iter(|| {
            let queues = PageQueues::partition(black_box(&script), 500).unwrap();
            black_box(queues.non_empty().count());
        });
    });
}

/// Resolve a mix of near-edge and far-edge coordinates on an A4 page.
fn bench_resolve(c: &mut Criterion) {
    let page = PageBox::new(595.28, 841.89);
    let values: Vec<Value> = ["12", "-12", "-0", "300.5", "-72.25", "0"]
        .into_iter()
        .map(Value::new)
        .collect();

    c.bench_function("resolve (3 coordinate pairs)", |b| {
        b.iter(|| {
            for pair in values.chunks(2) {
                black_box(page.point(&pair[0], &pair[1]).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_partition, bench_resolve);
criterion_main!(benches);
