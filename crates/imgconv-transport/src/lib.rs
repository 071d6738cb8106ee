// crates/imgconv-transport/src/lib.rs

//! Message framing (header + payload, tagged) and the in-process mailbox
//! transport that realizes the master/worker point-to-point protocol.

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

pub mod mailbox;
pub mod message;

pub use mailbox::{build_world, MasterEnd, WorkerEnd};
pub use message::{ChunkHeader, Envelope, Tag};
