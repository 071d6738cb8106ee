// crates/imgconv-conv/src/lib.rs

//! Applies a kernel to a row band. Purely data-parallel across output rows:
//! every thread reads the (read-only) band and writes into disjoint output
//! rows, so no locking is needed beyond the pool join at the end.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use anyhow::{Context, Result};
use imgconv_core::{Band, Image, Kernel, Pixel};
use rayon::prelude::*;

/// Apply `kernel` to `band`, producing an image of the owned rows only
/// (`band.true_rows()` tall), using up to `num_threads` worker threads.
///
/// Out-of-image neighbors (possible only at the very top/bottom of the
/// whole image, where the partitioner leaves halos absent) contribute zero
/// to the sum — the kernel weight at that tap is simply skipped.
///
/// # Errors
/// Returns an error if the thread pool can't be built.
pub fn apply(band: &Band, kernel: &Kernel, num_threads: usize) -> Result<Image> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("building convolution thread pool")?;

    let image = band.image();
    let width = image.width();
    let true_start = band.true_start();
    let true_end = band.true_end();
    let out_height = true_end - true_start + 1;

    let rows: Vec<Vec<Pixel>> = pool.install(|| {
        (true_start..=true_end)
            .into_par_iter()
            .map(|y| convolve_row(image, kernel, y))
            .collect()
    });

    let mut pixels = Vec::with_capacity(width as usize * out_height as usize);
    for row in rows {
        pixels.extend(row);
    }
    Image::new(width, out_height, pixels).context("assembling convolution output")
}

fn convolve_row(image: &Image, kernel: &Kernel, y: u32) -> Vec<Pixel> {
    let width = image.width();
    let height = image.height();
    let r = kernel.radius() as i32;

    let mut row = Vec::with_capacity(width as usize);
    for x in 0..width as i32 {
        let (mut sum_r, mut sum_g, mut sum_b) = (0.0f64, 0.0f64, 0.0f64);
        for dy in -r..=r {
            let sy = y as i32 + dy;
            if sy < 0 || sy >= height as i32 {
                continue;
            }
            for dx in -r..=r {
                let sx = x + dx;
                if sx < 0 || sx >= width as i32 {
                    continue;
                }
                let w = kernel.at(dy, dx);
                let px = image.get(sx as u32, sy as u32);
                sum_r += w * f64::from(px.r);
                sum_g += w * f64::from(px.g);
                sum_b += w * f64::from(px.b);
            }
        }
        row.push(Pixel::new(clamp_to_u8(sum_r), clamp_to_u8(sum_g), clamp_to_u8(sum_b)));
    }
    row
}

/// Clamp to `[0, 255]` and truncate toward zero, matching the reference
/// implementation's conditional-assignment-then-cast behavior.
fn clamp_to_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgconv_core::Operation;

    fn constant_band(width: u32, height: u32, value: Pixel, true_start: u32, true_end: u32) -> Band {
        Band::new(Image::filled(width, height, value), true_start, true_end).unwrap()
    }

    #[test]
    fn sharpen_is_identity_on_a_constant_image() {
        let value = Pixel::new(128, 128, 128);
        let band = constant_band(4, 4, value, 0, 3);
        let kernel = Operation::Sharpen.kernel();
        let out = apply(&band, &kernel, 2).unwrap();
        for px in out.pixels() {
            assert_eq!(*px, value);
        }
    }

    #[test]
    fn boxblur_weights_sum_to_one_is_identity_on_constant() {
        let value = Pixel::new(50, 60, 70);
        let band = constant_band(5, 5, value, 0, 4);
        let kernel = Operation::Boxblur.kernel();
        let out = apply(&band, &kernel, 1).unwrap();
        for px in out.pixels() {
            assert_eq!(*px, value);
        }
    }

    #[test]
    fn trivial_one_by_one_boxblur_is_identity() {
        let value = Pixel::new(7, 8, 9);
        let band = constant_band(1, 1, value, 0, 0);
        let kernel = Operation::Boxblur.kernel();
        let out = apply(&band, &kernel, 1).unwrap();
        assert_eq!(out.pixels(), &[value]);
    }

    #[test]
    fn ridge_responds_to_a_vertical_step() {
        // 2 wide x 4 tall: left column black, right column white.
        let mut pixels = Vec::new();
        for _ in 0..4 {
            pixels.push(Pixel::new(0, 0, 0));
            pixels.push(Pixel::new(255, 255, 255));
        }
        let img = Image::new(2, 4, pixels).unwrap();
        let band = Band::new(img, 0, 3).unwrap();
        let kernel = Operation::Ridge.kernel();
        let out = apply(&band, &kernel, 1).unwrap();
        // Interior rows (1, 2) should show a nonzero response at the step.
        assert_ne!(out.get(0, 1), Pixel::new(0, 0, 0));
        assert_ne!(out.get(1, 1), Pixel::new(255, 255, 255));
    }

    #[test]
    fn gaussblur5_on_a_delta_image_matches_center_weight() {
        let mut pixels = vec![Pixel::new(0, 0, 0); 25];
        pixels[12] = Pixel::new(255, 255, 255); // center of 5x5
        let img = Image::new(5, 5, pixels).unwrap();
        let band = Band::new(img, 0, 4).unwrap();
        let kernel = Operation::Gaussblur5.kernel();
        let out = apply(&band, &kernel, 1).unwrap();
        // Center output pixel = round-toward-zero(255 * 36/256) = 35.
        assert_eq!(out.get(2, 2).r, 35);
    }

    #[test]
    fn boundary_rows_get_zero_weight_extension_not_a_crash() {
        let value = Pixel::new(200, 10, 10);
        // true_start=0 means the top of this band is the top of the whole
        // image: rows above simply don't contribute.
        let band = constant_band(3, 3, value, 0, 2);
        let kernel = Operation::Edge.kernel();
        let out = apply(&band, &kernel, 1).unwrap();
        assert_eq!(out.height(), 3);
    }
}
