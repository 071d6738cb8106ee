// crates/imgconv-core/src/generator.rs

//! Synthetic image generators used by tests and the compare harness.

use rand::{rngs::StdRng, Rng as _, SeedableRng};

use crate::image::Image;
use crate::pixel::Pixel;

/// A `width x height` image filled uniformly with `value`.
#[must_use]
pub fn constant(width: u32, height: u32, value: Pixel) -> Image {
    Image::filled(width, height, value)
}

/// A `width x height` image, all-zero except a single white pixel at `(cx, cy)`.
///
/// # Panics
/// Panics if `(cx, cy)` is out of bounds.
#[must_use]
pub fn delta(width: u32, height: u32, cx: u32, cy: u32) -> Image {
    let mut pixels = vec![Pixel::BLACK; width as usize * height as usize];
    pixels[cy as usize * width as usize + cx as usize] = Pixel::new(255, 255, 255);
    Image::new(width, height, pixels).expect("generator produced a well-formed buffer")
}

/// A reproducible pseudo-random `width x height` image, seeded deterministically.
#[must_use]
pub fn random(width: u32, height: u32, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for _ in 0..(width as usize * height as usize) {
        pixels.push(Pixel::new(rng.random(), rng.random(), rng.random()));
    }
    Image::new(width, height, pixels).expect("generator produced a well-formed buffer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_is_reproducible_for_a_fixed_seed() {
        let a = random(8, 8, 7);
        let b = random(8, 8, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn delta_has_exactly_one_nonzero_pixel() {
        let img = delta(5, 5, 2, 2);
        let nonzero = img.pixels().iter().filter(|p| **p != Pixel::BLACK).count();
        assert_eq!(nonzero, 1);
        assert_eq!(img.get(2, 2), Pixel::new(255, 255, 255));
    }
}
