//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`] which wraps
//! the error conditions of loading, laying out and exporting a scene.

use std::io;

use thiserror::Error;

use crate::{coordinator::LayoutError, document::DocumentError, export, scene::SceneError};

/// The main error type for Trellis operations.
///
/// # Diagnostic Variants
///
/// The `Document` variant keeps the scene source next to the error so the
/// offending span can be shown to the user.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Document { err: DocumentError, src: String },

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Export error: {0}")]
    Export(#[from] export::Error),
}

impl TrellisError {
    /// Create a new `Document` error with the associated source text.
    pub fn new_document_error(err: DocumentError, src: impl Into<String>) -> Self {
        Self::Document {
            err,
            src: src.into(),
        }
    }
}
