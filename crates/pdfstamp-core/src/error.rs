// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdfstamp.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all pdfstamp operations.
///
/// Every variant is fatal: a stamping run is one atomic unit of work and
/// there is no per-command recovery.
#[derive(Debug, Error)]
pub enum StampError {
    // -- Command line --
    #[error("invalid arguments: {0}")]
    Usage(String),

    #[error("invalid command: {0}")]
    Grammar(String),

    // -- Page selection --
    #[error("invalid page selection: {0}")]
    PageRange(String),

    // -- Assets --
    #[error("failed to load {}: {reason}", path.display())]
    Resource { path: PathBuf, reason: String },

    // -- Rendering --
    #[error("rendering failed: {0}")]
    Render(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("font embedding failed: {0}")]
    Font(String),

    #[error("image embedding failed: {0}")]
    Image(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StampError {
    /// Shorthand for a resource load failure.
    pub fn resource(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Resource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StampError>;
