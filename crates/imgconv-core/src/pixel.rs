// crates/imgconv-core/src/pixel.rs

//! A single 24-bit RGB sample. No alpha channel.

use serde::{Deserialize, Serialize};

/// Unsigned 8-bit RGB triple. Equality is field-wise.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Pixel {
    /// Black pixel, used to pad the dummy empty-chunk image.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Build a pixel from its three channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
