//! CLI logic for the Trellis layout tool.
//!
//! Loads a TOML scene document, lays it out and writes the result as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use trellis::{SceneBuilder, TrellisError};

/// Run the Trellis CLI application
///
/// Reads the scene named by `args.input`, runs layout passes until the
/// scene settles and writes the SVG to `args.output`.
///
/// # Errors
///
/// Returns `TrellisError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed scene documents
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), TrellisError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing scene"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = SceneBuilder::new(app_config);
    let document = builder.parse(&source)?;
    let laid_out = builder.layout(&document)?;

    let passes = laid_out.reports().len();
    info!(passes; "Scene laid out");

    builder.write_svg(&laid_out, &args.output)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
