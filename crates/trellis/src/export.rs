//! Export of laid-out scenes.

pub mod svg;

use std::io;

use thiserror::Error;

/// Errors raised while exporting a scene.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
