// crates/imgconv-engine/src/sft.rs

//! Static, shared-filesystem strategy: every rank independently computes its
//! band geometry and issues its own positional reads against the input
//! file, runs the convolution in its own thread pool, and the results are
//! gathered back in rank order.
//!
//! The reference implementation reads the file in raw on-disk (bottom-to-top)
//! order and corrects for it with a `virtual_rank = P - 1 - rank` indirection
//! before composing. `imgconv_bmp::BmpReader::read_rows` already returns rows
//! in canonical top-to-bottom order regardless of on-disk layout, so that
//! indirection has nothing left to correct here — gathering rank outputs in
//! plain ascending rank order already satisfies the required invariant
//! ("composed image equals the canonical top-to-bottom image"). §4.2
//! explicitly allows collapsing the virtualization as long as that invariant
//! holds.

use anyhow::{anyhow, Result};
use imgconv_core::{Band, Image, Partitioner, RunConfig};

/// Run the SFT strategy: `config.topology.processes` ranks each read their
/// own band directly from `config.input`.
///
/// # Errors
/// Returns an error if any rank's read, partition, or convolution fails.
pub fn run_sft(config: &RunConfig) -> Result<Image> {
    let kernel = config.operation.kernel();
    let r = kernel.radius();
    let num_threads = config.topology.threads_per_process_sft();
    let p = config.topology.processes;

    let reader = imgconv_bmp::BmpReader::open(&config.input).map_err(|e| {
        tracing::error!(operation = "open", error = %e, "SFT failed to open input to determine geometry");
        e
    })?;
    let geometry = reader.geometry();
    let height = geometry.height;
    let width = geometry.width;

    tracing::info!(processes = p, height, width, "running SFT strategy");

    let outputs: Vec<Result<Image>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..p)
            .map(|rank| {
                let input = config.input.clone();
                let kernel = kernel.clone();
                scope.spawn(move || -> Result<Image> {
                    let reader = imgconv_bmp::BmpReader::open(&input).map_err(|e| {
                        tracing::error!(rank, operation = "open", error = %e, "SFT rank failed to open its own file handle");
                        e
                    })?;
                    let g = Partitioner::band_geometry(height, p, rank, r);
                    tracing::debug!(rank, abs_first = g.abs_first, true_rows = g.true_rows, "SFT band geometry");
                    let band_image = reader.read_rows(g.band_first(), g.band_height()).map_err(|e| {
                        tracing::error!(rank, operation = "read_rows", error = %e, "SFT rank failed to read its band");
                        e
                    })?;
                    let band = Band::new(band_image, g.true_start(), g.true_end()).map_err(|e| {
                        tracing::error!(rank, operation = "band_new", error = %e, "SFT rank produced an invalid band");
                        e
                    })?;
                    imgconv_conv::apply(&band, &kernel, num_threads).map_err(|e| {
                        tracing::error!(rank, operation = "convolve", error = %e, "SFT rank convolution failed");
                        e
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| {
                h.join().map_err(|_| {
                    tracing::error!(rank, operation = "thread_join", "SFT rank thread panicked");
                    anyhow!("SFT rank {rank} thread panicked")
                })?
            })
            .collect()
    });

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for out in outputs {
        pixels.extend_from_slice(out?.pixels());
    }

    tracing::info!("SFT run complete");
    Image::new(width, height, pixels).map_err(Into::into)
}
