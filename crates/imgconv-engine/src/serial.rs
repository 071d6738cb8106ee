// crates/imgconv-engine/src/serial.rs

//! The single-threaded, single-rank reference implementation. Every other
//! strategy is required to reproduce this pixel-for-pixel (§8, "strategy
//! equivalence").

use anyhow::Result;
use imgconv_core::{Band, Image, RunConfig};

/// Run the serial reference implementation over `config.input`.
///
/// # Errors
/// Returns an error on any I/O or convolution failure.
pub fn run_serial(config: &RunConfig) -> Result<Image> {
    tracing::info!(input = %config.input.display(), operation = %config.operation, "running serial reference");

    let image = imgconv_bmp::read_whole(&config.input).map_err(|e| {
        tracing::error!(operation = "read_whole", error = %e, "serial run failed to read the input image");
        e
    })?;
    let height = image.height();
    let kernel = config.operation.kernel();
    let band = Band::new(image, 0, height - 1).map_err(|e| {
        tracing::error!(operation = "band_new", error = %e, "serial run produced an invalid band");
        e
    })?;
    let out = imgconv_conv::apply(&band, &kernel, 1).map_err(|e| {
        tracing::error!(operation = "convolve", error = %e, "serial run convolution failed");
        e
    })?;

    tracing::info!(height, "serial run complete");
    Ok(out)
}
