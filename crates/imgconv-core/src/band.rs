// crates/imgconv-core/src/band.rs

//! A row band: the image slice one rank owns, plus the halo rows borrowed
//! read-only from its neighbors.

use anyhow::{ensure, Result};

use crate::image::Image;

/// A process-local slice of an [`Image`], with halo rows included.
///
/// `true_start`/`true_end` are row indices *within this band* (inclusive)
/// delimiting the rows this band's owner is responsible for producing.
#[derive(Clone, Debug)]
pub struct Band {
    image: Image,
    true_start: u32,
    true_end: u32,
}

impl Band {
    /// Wrap an image as a band with the given owned-row bounds.
    ///
    /// # Errors
    /// Returns an error if `true_start > true_end` or `true_end >= image.height()`.
    pub fn new(image: Image, true_start: u32, true_end: u32) -> Result<Self> {
        ensure!(true_start <= true_end, "true_start {true_start} > true_end {true_end}");
        ensure!(
            true_end < image.height(),
            "true_end {true_end} out of bounds for band height {}",
            image.height()
        );
        Ok(Self { image, true_start, true_end })
    }

    /// The underlying image (halos included).
    #[inline]
    #[must_use]
    pub const fn image(&self) -> &Image {
        &self.image
    }

    /// First owned row, inclusive, indexed within the band.
    #[inline]
    #[must_use]
    pub const fn true_start(&self) -> u32 {
        self.true_start
    }

    /// Last owned row, inclusive, indexed within the band.
    #[inline]
    #[must_use]
    pub const fn true_end(&self) -> u32 {
        self.true_end
    }

    /// Number of owned rows (excludes halos).
    #[inline]
    #[must_use]
    pub const fn true_rows(&self) -> u32 {
        self.true_end - self.true_start + 1
    }

    /// Rows borrowed from the rank above (0 at the top of the whole image).
    #[inline]
    #[must_use]
    pub const fn halo_top(&self) -> u32 {
        self.true_start
    }

    /// Rows borrowed from the rank below (0 at the bottom of the whole image).
    #[inline]
    #[must_use]
    pub fn halo_bottom(&self) -> u32 {
        self.image.height() - 1 - self.true_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;

    #[test]
    fn halo_counts_derive_from_true_bounds() {
        let img = Image::filled(4, 10, Pixel::BLACK);
        let band = Band::new(img, 2, 6).unwrap();
        assert_eq!(band.true_rows(), 5);
        assert_eq!(band.halo_top(), 2);
        assert_eq!(band.halo_bottom(), 3);
    }

    #[test]
    fn rejects_out_of_bounds() {
        let img = Image::filled(1, 3, Pixel::BLACK);
        assert!(Band::new(img, 0, 3).is_err());
    }
}
