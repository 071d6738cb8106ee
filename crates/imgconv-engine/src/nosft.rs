// crates/imgconv-engine/src/nosft.rs

//! Static, non-shared-filesystem strategy: rank 0 reads the whole image,
//! scatters row bands (with halos) to every rank, each rank convolves its
//! own band, and the owned-row outputs are gathered back in rank order.

use anyhow::{anyhow, Result};
use imgconv_core::{Band, Image, Partitioner, RunConfig};

/// Slice `image` into one [`Band`] per rank, with halos overlapping into
/// neighboring bands exactly as the partitioner's halo policy requires.
///
/// This stands in for the reference implementation's `MPI_Scatterv` over
/// per-rank send counts and displacements: the same source pixels are
/// copied into more than one destination band when they fall in a halo.
///
/// # Errors
/// Returns an error if a band's geometry is inconsistent with the source image.
pub fn scatter(image: &Image, num_ranks: u32, halo_radius: u32) -> Result<Vec<Band>> {
    let height = image.height();
    let width = image.width();
    let mut bands = Vec::with_capacity(num_ranks as usize);

    for rank in 0..num_ranks {
        let g = Partitioner::band_geometry(height, num_ranks, rank, halo_radius);
        let mut pixels = Vec::with_capacity(width as usize * g.band_height() as usize);
        for y in g.band_first()..g.band_first() + g.band_height() {
            pixels.extend_from_slice(image.row(y));
        }
        let band_image = Image::new(width, g.band_height(), pixels)?;
        bands.push(Band::new(band_image, g.true_start(), g.true_end())?);
    }
    Ok(bands)
}

/// Gather per-rank owned-row outputs (in rank order) into the composite image.
///
/// # Errors
/// Returns an error if the assembled buffer doesn't match `width * total_height`.
pub fn gather(width: u32, outputs: Vec<Image>) -> Result<Image> {
    let total_height: u32 = outputs.iter().map(Image::height).sum();
    let mut pixels = Vec::with_capacity(width as usize * total_height as usize);
    for out in outputs {
        pixels.extend_from_slice(out.pixels());
    }
    Image::new(width, total_height, pixels)
}

/// Run the NoSFT strategy end to end.
///
/// # Errors
/// Returns an error on any read, scatter, convolution, or gather failure.
pub fn run_nosft(config: &RunConfig) -> Result<Image> {
    let kernel = config.operation.kernel();
    let r = kernel.radius();
    let num_threads = config.topology.threads_per_process_distributed();
    let p = config.topology.processes;

    tracing::info!(processes = p, "running NoSFT strategy: rank 0 reading whole image");
    let image = imgconv_bmp::read_whole(&config.input).map_err(|e| {
        tracing::error!(rank = 0, operation = "read_whole", error = %e, "NoSFT rank 0 failed to read the input image");
        e
    })?;
    let width = image.width();

    let bands = scatter(&image, p, r).map_err(|e| {
        tracing::error!(rank = 0, operation = "scatter", error = %e, "NoSFT rank 0 failed to scatter bands");
        e
    })?;
    tracing::debug!(num_bands = bands.len(), "scattered bands to ranks");

    let outputs: Vec<Result<Image>> = std::thread::scope(|scope| {
        let handles: Vec<_> = bands
            .into_iter()
            .enumerate()
            .map(|(rank, band)| {
                let kernel = kernel.clone();
                scope.spawn(move || -> Result<Image> {
                    tracing::debug!(rank, true_rows = band.true_rows(), "convolving band");
                    imgconv_conv::apply(&band, &kernel, num_threads).map_err(|e| {
                        tracing::error!(rank, operation = "convolve", error = %e, "NoSFT rank convolution failed");
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
                    tracing::error!(rank, operation = "thread_join", "NoSFT rank thread panicked");
                    anyhow!("NoSFT rank {rank} thread panicked")
                })?
            })
            .collect()
    });

    let outputs: Result<Vec<Image>> = outputs.into_iter().collect();
    let result = gather(width, outputs?).map_err(|e| {
        tracing::error!(rank = 0, operation = "gather", error = %e, "NoSFT rank 0 failed to gather outputs");
        e
    });
    tracing::info!("NoSFT run complete");
    result
}
