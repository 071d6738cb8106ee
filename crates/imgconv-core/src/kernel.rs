// crates/imgconv-core/src/kernel.rs

//! The fixed kernel catalog. Weights are double-precision and match the
//! reference implementation's `generate_kernel` table exactly.

use serde::{Deserialize, Serialize};

/// A convolution kernel: an `S x S` (S odd) matrix of double-precision weights.
#[derive(Clone, Debug)]
pub struct Kernel {
    /// Side length, odd, one of {3, 5}.
    pub side: u32,
    /// Row-major weights, `side * side` entries.
    pub weights: Vec<f64>,
}

impl Kernel {
    /// Halo radius this kernel requires: `side / 2`.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.side / 2
    }

    /// Weight at kernel-relative offset `(dy, dx)`, both in `[-r, r]`.
    #[inline]
    #[must_use]
    pub fn at(&self, dy: i32, dx: i32) -> f64 {
        let r = self.radius() as i32;
        let row = (dy + r) as usize;
        let col = (dx + r) as usize;
        self.weights[row * self.side as usize + col]
    }
}

/// The fixed enumeration of supported kernels. Process-wide, immutable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// 3x3 Laplacian-style ridge detector.
    Ridge,
    /// 3x3 edge detector.
    Edge,
    /// 3x3 sharpening kernel.
    Sharpen,
    /// 3x3 uniform box blur.
    Boxblur,
    /// 3x3 binomial (Gaussian-ish) blur.
    Gaussblur3,
    /// 5x5 binomial Gaussian blur.
    Gaussblur5,
    /// 5x5 unsharp mask.
    Unsharp5,
}

impl Operation {
    /// All catalog entries, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Ridge,
        Self::Edge,
        Self::Sharpen,
        Self::Boxblur,
        Self::Gaussblur3,
        Self::Gaussblur5,
        Self::Unsharp5,
    ];

    /// Integer tag used on the wire (`ChunkHeader::operation_tag`).
    #[inline]
    #[must_use]
    pub const fn tag(self) -> i32 {
        match self {
            Self::Ridge => 0,
            Self::Edge => 1,
            Self::Sharpen => 2,
            Self::Boxblur => 3,
            Self::Gaussblur3 => 4,
            Self::Gaussblur5 => 5,
            Self::Unsharp5 => 6,
        }
    }

    /// Look up an operation from its wire tag.
    #[must_use]
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tag() == tag)
    }

    /// The kernel matrix for this operation.
    #[must_use]
    pub fn kernel(self) -> Kernel {
        match self {
            Self::Ridge => Kernel {
                side: 3,
                weights: vec![0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0],
            },
            Self::Edge => Kernel {
                side: 3,
                weights: vec![-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
            },
            Self::Sharpen => Kernel {
                side: 3,
                weights: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
            },
            Self::Boxblur => {
                let w = 1.0 / 9.0;
                Kernel { side: 3, weights: vec![w; 9] }
            }
            Self::Gaussblur3 => Kernel {
                side: 3,
                weights: [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0]
                    .into_iter()
                    .map(|w| w / 16.0)
                    .collect(),
            },
            Self::Gaussblur5 => Kernel {
                side: 5,
                #[rustfmt::skip]
                weights: [
                    1.0,  4.0,  6.0,  4.0, 1.0,
                    4.0, 16.0, 24.0, 16.0, 4.0,
                    6.0, 24.0, 36.0, 24.0, 6.0,
                    4.0, 16.0, 24.0, 16.0, 4.0,
                    1.0,  4.0,  6.0,  4.0, 1.0,
                ]
                .into_iter()
                .map(|w| w / 256.0)
                .collect(),
            },
            Self::Unsharp5 => Kernel {
                side: 5,
                #[rustfmt::skip]
                weights: [
                    -1.0,  -4.0,   -6.0,  -4.0, -1.0,
                    -4.0, -16.0,  -24.0, -16.0, -4.0,
                    -6.0, -24.0,  476.0, -24.0, -6.0,
                    -4.0, -16.0,  -24.0, -16.0, -4.0,
                    -1.0,  -4.0,   -6.0,  -4.0, -1.0,
                ]
                .into_iter()
                .map(|w| w / 256.0)
                .collect(),
            },
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ridge => "RIDGE",
            Self::Edge => "EDGE",
            Self::Sharpen => "SHARPEN",
            Self::Boxblur => "BOXBLUR",
            Self::Gaussblur3 => "GAUSSBLUR3",
            Self::Gaussblur5 => "GAUSSBLUR5",
            Self::Unsharp5 => "UNSHARP5",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RIDGE" => Ok(Self::Ridge),
            "EDGE" => Ok(Self::Edge),
            "SHARPEN" => Ok(Self::Sharpen),
            "BOXBLUR" => Ok(Self::Boxblur),
            "GAUSSBLUR3" => Ok(Self::Gaussblur3),
            "GAUSSBLUR5" => Ok(Self::Gaussblur5),
            "UNSHARP5" => Ok(Self::Unsharp5),
            other => anyhow::bail!("unknown operation {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_match_side() {
        assert_eq!(Operation::Ridge.kernel().radius(), 1);
        assert_eq!(Operation::Gaussblur5.kernel().radius(), 2);
    }

    #[test]
    fn gaussblur5_center_weight_is_36_over_256() {
        let k = Operation::Gaussblur5.kernel();
        assert!((k.at(0, 0) - 36.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn unsharp5_center_weight_is_476_over_256() {
        let k = Operation::Unsharp5.kernel();
        assert!((k.at(0, 0) - 476.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn boxblur_weights_sum_to_one() {
        let k = Operation::Boxblur.kernel();
        let sum: f64 = k.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tag_roundtrips() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_tag(op.tag()), Some(op));
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("ridge".parse::<Operation>().unwrap(), Operation::Ridge);
        assert!("not-a-kernel".parse::<Operation>().is_err());
    }
}
