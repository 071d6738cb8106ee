// crates/imgconv-transport/src/message.rs

//! The on-wire record shapes: a fixed six-field header plus a contiguous
//! pixel payload, dispatched under a small tag namespace so headers and
//! payloads belonging to different chunks are never ambiguous in flight.

use imgconv_core::Pixel;

/// Fixed-width header carried ahead of every chunk payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    /// First owned row, inclusive, indexed within the accompanying band.
    pub true_start: i32,
    /// Last owned row, inclusive, indexed within the accompanying band.
    pub true_end: i32,
    /// Band height (rows, halos included).
    pub height: i32,
    /// Band width.
    pub width: i32,
    /// Thread budget the receiver should convolve with.
    pub num_threads: i32,
    /// Kernel selector (`Operation::tag`).
    pub operation_tag: i32,
}

/// The minimum five-tag namespace required to keep headers and payloads
/// unambiguous when multiple chunks may be in flight at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Master -> worker: a chunk header is coming.
    WorkHeaderSend,
    /// Master -> worker: the chunk's pixel payload.
    WorkDataSend,
    /// Worker -> master: the processed chunk's header.
    WorkHeaderReply,
    /// Worker -> master: the processed chunk's pixel payload.
    WorkDataReply,
    /// Master -> worker: no more work; the worker should exit.
    Terminate,
}

/// One framed message: a tag, an optional header, and an optional payload.
/// `Terminate` carries neither.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Which kind of message this is.
    pub tag: Tag,
    /// Present for `WorkHeaderSend`/`WorkHeaderReply`.
    pub header: Option<ChunkHeader>,
    /// Present for `WorkDataSend`/`WorkDataReply`.
    pub payload: Option<Vec<Pixel>>,
}

impl Envelope {
    /// Build a `Terminate` envelope (zero-length, no header, no payload).
    #[must_use]
    pub const fn terminate() -> Self {
        Self { tag: Tag::Terminate, header: None, payload: None }
    }

    /// Build a work header envelope (`WorkHeaderSend` or `WorkHeaderReply`).
    #[must_use]
    pub const fn header(tag: Tag, header: ChunkHeader) -> Self {
        Self { tag, header: Some(header), payload: None }
    }

    /// Build a work data envelope (`WorkDataSend` or `WorkDataReply`).
    #[must_use]
    pub const fn data(tag: Tag, payload: Vec<Pixel>) -> Self {
        Self { tag, header: None, payload: Some(payload) }
    }
}
