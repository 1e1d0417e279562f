// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading existing documents, the per-page drawing surface, and
// writing stamped output.

pub mod canvas;
pub mod fonts;
pub mod images;
pub mod reader;
pub mod writer;

pub use canvas::PageCanvas;
pub use reader::PdfReader;
pub use writer::{PageStamp, PdfWriter};
