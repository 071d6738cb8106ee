// crates/imgconv-core/src/partition.rs

//! Deterministic row partitioning shared by the SFT and NoSFT strategies.
//! The master/worker strategy uses a streaming variant of the same halo
//! policy; see `imgconv-bmp::chunk`.

/// The geometry one rank owns out of an `H`-row image split across `P` ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandGeometry {
    /// Absolute index (0-based, top of image) of the first row this rank owns.
    pub abs_first: u32,
    /// Number of rows this rank owns (excludes halos).
    pub true_rows: u32,
    /// Halo rows borrowed from the rank above; 0 at the top of the image.
    pub halo_top: u32,
    /// Halo rows borrowed from the rank below; 0 at the bottom of the image.
    pub halo_bottom: u32,
}

impl BandGeometry {
    /// Absolute first row of the band (owned rows minus the top halo).
    #[inline]
    #[must_use]
    pub fn band_first(&self) -> u32 {
        self.abs_first - self.halo_top
    }

    /// Total band height, owned rows plus both halos.
    #[inline]
    #[must_use]
    pub fn band_height(&self) -> u32 {
        self.true_rows + self.halo_top + self.halo_bottom
    }

    /// True-bounds pair, indexed *within the band* (i.e. relative to `band_first`).
    #[inline]
    #[must_use]
    pub fn true_start(&self) -> u32 {
        self.halo_top
    }

    /// Last owned row, indexed within the band, inclusive.
    #[inline]
    #[must_use]
    pub fn true_end(&self) -> u32 {
        self.halo_top + self.true_rows - 1
    }
}

/// Pure functions mapping `(height, num_ranks, rank, halo radius)` to band geometry.
pub struct Partitioner;

impl Partitioner {
    /// Rows owned by rank `i` out of `height` split across `num_ranks` ranks.
    #[must_use]
    pub fn true_rows(height: u32, num_ranks: u32, i: u32) -> u32 {
        let q = height / num_ranks;
        let m = height % num_ranks;
        q + u32::from(i < m)
    }

    /// Rows owned by ranks `0..i`, i.e. the absolute first row rank `i` owns.
    #[must_use]
    pub fn skip(height: u32, num_ranks: u32, i: u32) -> u32 {
        let q = height / num_ranks;
        let m = height % num_ranks;
        q * i + i.min(m)
    }

    /// Full band geometry for rank `i`, including halo policy for radius `r`.
    ///
    /// `i == 0` gets no top halo; `i == num_ranks - 1` gets no bottom halo
    /// (there is nothing to borrow past the edge of the image).
    #[must_use]
    pub fn band_geometry(height: u32, num_ranks: u32, i: u32, r: u32) -> BandGeometry {
        let abs_first = Self::skip(height, num_ranks, i);
        let true_rows = Self::true_rows(height, num_ranks, i);
        let halo_top = if i > 0 { r } else { 0 };
        let halo_bottom = if i < num_ranks - 1 { r } else { 0 };
        BandGeometry { abs_first, true_rows, halo_top, halo_bottom }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiling_is_contiguous_and_covers_the_image() {
        let height = 37;
        let num_ranks = 5;
        let mut covered = 0u32;
        let mut next_first = 0u32;
        for i in 0..num_ranks {
            let g = Partitioner::band_geometry(height, num_ranks, i, 2);
            assert_eq!(g.abs_first, next_first);
            next_first += g.true_rows;
            covered += g.true_rows;
        }
        assert_eq!(covered, height);
        assert_eq!(next_first, height);
    }

    #[test]
    fn edge_ranks_have_no_outward_halo() {
        let g0 = Partitioner::band_geometry(100, 4, 0, 2);
        assert_eq!(g0.halo_top, 0);
        assert_eq!(g0.halo_bottom, 2);

        let glast = Partitioner::band_geometry(100, 4, 3, 2);
        assert_eq!(glast.halo_top, 2);
        assert_eq!(glast.halo_bottom, 0);
    }

    #[test]
    fn interior_ranks_have_full_halos() {
        let g = Partitioner::band_geometry(100, 4, 1, 2);
        assert_eq!(g.halo_top, 2);
        assert_eq!(g.halo_bottom, 2);
        assert_eq!(g.band_height(), g.true_rows + 4);
        assert_eq!(g.true_start(), 2);
        assert_eq!(g.true_end(), g.true_rows + 1);
    }

    #[test]
    fn single_rank_owns_everything_with_no_halo() {
        let g = Partitioner::band_geometry(10, 1, 0, 2);
        assert_eq!(g.true_rows, 10);
        assert_eq!(g.halo_top, 0);
        assert_eq!(g.halo_bottom, 0);
    }
}
