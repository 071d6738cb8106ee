// crates/imgconv-engine/src/lib.rs

//! Orchestrates the serial reference and the three distributed strategies
//! (SFT, NoSFT, master/worker) over the shared partitioning, BMP, and
//! convolution crates.

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

pub mod master_worker;
pub mod nosft;
pub mod orchestrator;
pub mod serial;
pub mod sft;

pub use orchestrator::run;
