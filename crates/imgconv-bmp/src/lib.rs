// crates/imgconv-bmp/src/lib.rs

//! 24-bit BMP geometry parsing, row-range reads, the streaming chunk reader
//! used by the master/worker strategy, and the writer.

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

pub mod accessor;
pub mod chunk;
pub mod format;

pub use accessor::{read_whole, save, BmpReader};
pub use chunk::{ChunkReader, ChunkResult};
pub use format::BmpGeometry;
