// crates/imgconv-bmp/src/chunk.rs

//! Streaming chunk reader used by the master/worker strategy: reads the file
//! in row chunks (with halos) without ever holding the whole image in
//! memory, advancing a persistent "next row" cursor by each chunk's *owned*
//! row count so consecutive chunks' halos correctly overlap.

use std::path::Path;

use anyhow::Result;
use imgconv_core::Band;

use crate::accessor::BmpReader;
use crate::format::BmpGeometry;

/// One streamed chunk plus the absolute (canonical, top-to-bottom) row index
/// its owned rows start at — what the master needs to splice the reply.
pub struct ChunkResult {
    /// The row band: halos plus owned rows, with `true_start`/`true_end` set.
    pub band: Band,
    /// Absolute row index of the first *owned* row, for splicing into the composite image.
    pub abs_first_row: u32,
}

/// Drives the master's sequential chunked reads of one BMP file.
pub struct ChunkReader {
    reader: BmpReader,
    next_row: u32,
}

impl ChunkReader {
    /// Open `path` for chunked streaming.
    ///
    /// # Errors
    /// Returns an error if the file can't be opened or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = BmpReader::open(path)?;
        Ok(Self { reader, next_row: 0 })
    }

    /// Image geometry.
    #[must_use]
    pub fn geometry(&self) -> BmpGeometry {
        self.reader.geometry()
    }

    /// Read the next chunk of up to `chunk_size` owned rows, including up to
    /// `halo_dim` halo rows on each side per the four-case policy (first
    /// chunk has no top halo, last chunk has no bottom halo, the
    /// second-to-last chunk's bottom halo may be partial, every other chunk
    /// gets both halos in full).
    ///
    /// Returns `Ok(None)` once every row has been distributed — the
    /// "empty chunk" case that tells the master to terminate the next idle
    /// worker instead of dispatching more work.
    ///
    /// # Errors
    /// Returns an error on a read failure.
    pub fn next_chunk(&mut self, chunk_size: u32, halo_dim: u32) -> Result<Option<ChunkResult>> {
        let height = self.geometry().height;
        if self.next_row >= height {
            return Ok(None);
        }

        let next_row = self.next_row;
        let is_first = next_row == 0;
        let remaining = height - next_row;

        let (read_start, rows_to_read, true_start, owned_rows) = if is_first {
            if chunk_size >= height {
                (0, height, 0, height)
            } else if chunk_size + halo_dim >= height {
                let halo_bottom = height - chunk_size;
                (0, chunk_size + halo_bottom, 0, chunk_size)
            } else {
                (0, chunk_size + halo_dim, 0, chunk_size)
            }
        } else if remaining <= chunk_size {
            // Last chunk: no bottom halo, owns every remaining row.
            let rows_to_read = halo_dim + remaining;
            (next_row - halo_dim, rows_to_read, halo_dim, remaining)
        } else if remaining <= chunk_size + halo_dim {
            // Second-to-last chunk: bottom halo is only partially available.
            let halo_bottom_avail = height - (next_row + chunk_size);
            let rows_to_read = halo_dim + chunk_size + halo_bottom_avail;
            (next_row - halo_dim, rows_to_read, halo_dim, chunk_size)
        } else {
            // Any interior chunk: both halos in full.
            let rows_to_read = 2 * halo_dim + chunk_size;
            (next_row - halo_dim, rows_to_read, halo_dim, chunk_size)
        };

        let true_end = true_start + owned_rows - 1;
        let image = self.reader.read_rows(read_start, rows_to_read).map_err(|e| {
            tracing::error!(operation = "read_rows", read_start, rows_to_read, error = %e, "chunk reader failed to read rows");
            e
        })?;
        let band = Band::new(image, true_start, true_end).map_err(|e| {
            tracing::error!(operation = "band_new", true_start, true_end, error = %e, "chunk reader produced an invalid band");
            e
        })?;

        let abs_first_row = next_row;
        self.next_row += owned_rows;

        Ok(Some(ChunkResult { band, abs_first_row }))
    }
}


#[cfg(test)]
mod imgconv_bmp_test_support {
    use std::path::Path;

    use imgconv_core::{Image, Pixel};

    pub fn write_gradient_bmp(path: &Path, width: u32, height: u32) {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(Pixel::new((x % 256) as u8, (y % 256) as u8, 0));
            }
        }
        let image = Image::new(width, height, pixels).unwrap();
        crate::accessor::save(path, &image).unwrap();
    }
}
