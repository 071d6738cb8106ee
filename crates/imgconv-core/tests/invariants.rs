//! Invariants for the row partitioner.
//!
//! These tests treat the partitioner as the sole source of truth for how an
//! image's rows are divided across ranks: every other strategy (serial, SFT,
//! NoSFT, master/worker) must agree with the tiling and halo policy proven
//! here, for any height/process-count/halo-radius combination that makes
//! sense (every rank owns at least one row).

use proptest::prelude::*;

use imgconv_core::Partitioner;

proptest! {
    /// Tiling: row ranges are contiguous, non-overlapping, and cover `[0, H)`.
    #[test]
    fn tiling_covers_the_image_without_gaps_or_overlap(
        height in 1u32..2000,
        num_ranks in 1u32..64,
        r in 0u32..8,
    ) {
        prop_assume!(height >= num_ranks * (2 * r + 1));

        let mut next_first = 0u32;
        let mut covered = 0u32;
        for i in 0..num_ranks {
            let g = Partitioner::band_geometry(height, num_ranks, i, r);
            prop_assert_eq!(g.abs_first, next_first);
            next_first += g.true_rows;
            covered += g.true_rows;
        }
        prop_assert_eq!(covered, height);
        prop_assert_eq!(next_first, height);
    }

    /// Halo availability: every interior rank gets exactly `r` halo rows on
    /// each side; edge ranks get no halo on the side facing outside the image.
    #[test]
    fn halo_availability_matches_rank_position(
        height in 1u32..2000,
        num_ranks in 1u32..64,
        r in 0u32..8,
    ) {
        prop_assume!(height >= num_ranks * (2 * r + 1));

        for i in 0..num_ranks {
            let g = Partitioner::band_geometry(height, num_ranks, i, r);
            let expected_top = if i > 0 { r } else { 0 };
            let expected_bottom = if i < num_ranks - 1 { r } else { 0 };
            prop_assert_eq!(g.halo_top, expected_top);
            prop_assert_eq!(g.halo_bottom, expected_bottom);
            prop_assert_eq!(g.band_height(), g.true_rows + g.halo_top + g.halo_bottom);
            prop_assert_eq!(g.true_start(), g.halo_top);
            prop_assert_eq!(g.true_end(), g.halo_top + g.true_rows - 1);
        }
    }

    /// `true_rows` never differs by more than one row across ranks, and the
    /// sum always reconstructs the original height exactly (no rounding loss).
    #[test]
    fn row_counts_are_balanced_within_one(height in 1u32..2000, num_ranks in 1u32..64) {
        let counts: Vec<u32> = (0..num_ranks).map(|i| Partitioner::true_rows(height, num_ranks, i)).collect();
        let min = *counts.iter().min().unwrap();
        let max = *counts.iter().max().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert_eq!(counts.iter().sum::<u32>(), height);
    }
}
