// crates/imgconv-core/src/lib.rs

//! Core types shared by every strategy: pixels, images, row bands, the
//! kernel catalog, and the partitioning math that turns (height, process
//! count, rank) into a row range plus halos.

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

pub mod band;
pub mod config;
pub mod generator;
pub mod image;
pub mod kernel;
pub mod partition;
pub mod pixel;

pub use band::Band;
pub use config::{Mode, RunConfig};
pub use image::Image;
pub use kernel::{Kernel, Operation};
pub use partition::{BandGeometry, Partitioner};
pub use pixel::Pixel;
