// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfstamp-document — The stamping interpreter and the PDF it draws into.
//
// Provides the two-pass interpreter (page selection, resource preloading,
// per-page execution), PDF reading and writing over lopdf, and loading of
// the fonts and images a script references.

pub mod assets;
pub mod interp;
pub mod pdf;

// Re-export the primary structs so callers can use `pdfstamp_document::Stamper` etc.
pub use assets::{AssetLoader, FontHandle, FsLoader, ImageAsset, StandardFont};
pub use interp::{PageQueues, ResourceCache, Stamper};
pub use pdf::{PdfReader, PdfWriter};
