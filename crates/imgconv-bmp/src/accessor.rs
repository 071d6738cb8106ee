// crates/imgconv-bmp/src/accessor.rs

//! Opens a BMP file and reads contiguous row ranges into the canonical
//! top-to-bottom layout. `read_rows` takes its own file handle (via
//! `try_clone`) so concurrent callers never share a seek cursor — this is
//! what lets the SFT strategy issue positional reads from every rank without
//! a lock.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{Context, Result};
use imgconv_core::{Image, Pixel};

use crate::format::{self, BmpGeometry};

/// An opened BMP file, ready for row-range reads.
pub struct BmpReader {
    file: File,
    geometry: BmpGeometry,
}

impl BmpReader {
    /// Open `path`, parsing and validating the header.
    ///
    /// # Errors
    /// Returns an error if the file can't be opened or the header is invalid.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("opening BMP file {}", path.display())).map_err(|e| {
            tracing::error!(operation = "open", error = %e, "failed to open BMP file");
            e
        })?;
        let geometry = format::read_header(&mut file)
            .with_context(|| format!("parsing BMP header of {}", path.display()))
            .map_err(|e| {
                tracing::error!(operation = "read_header", error = %e, "failed to parse BMP header");
                e
            })?;
        Ok(Self { file, geometry })
    }

    /// Parsed geometry of the opened file.
    #[must_use]
    pub fn geometry(&self) -> BmpGeometry {
        self.geometry
    }

    /// Read `count` contiguous rows starting at canonical (top-to-bottom) row
    /// `first_row`, returning them as a top-to-bottom [`Image`].
    ///
    /// Uses an independent cloned file handle so this call never races with
    /// another thread/rank reading the same underlying file.
    ///
    /// # Errors
    /// Returns an error on a short read or seek failure.
    pub fn read_rows(&self, first_row: u32, count: u32) -> Result<Image> {
        let mut handle = self.file.try_clone().context("cloning BMP file handle for positional read")?;
        let width = self.geometry.width;
        let stride = self.geometry.row_stride as usize;
        let pixel_bytes = width as usize * 3;

        let mut pixels = vec![Pixel::default(); width as usize * count as usize];
        let mut row_buf = vec![0u8; stride];

        for i in 0..count {
            let canonical_row = first_row + i;
            let offset = self.geometry.row_offset(canonical_row);
            handle
                .seek(SeekFrom::Start(offset))
                .with_context(|| format!("seeking to row {canonical_row}"))
                .map_err(|e| {
                    tracing::error!(operation = "seek", row = canonical_row, error = %e, "failed to seek to row");
                    e
                })?;
            handle
                .read_exact(&mut row_buf)
                .with_context(|| format!("reading row {canonical_row}, short read"))
                .map_err(|e| {
                    tracing::error!(operation = "read_exact", row = canonical_row, error = %e, "short read while reading row");
                    e
                })?;

            let dst_row_start = i as usize * width as usize;
            for x in 0..width as usize {
                let b = row_buf[x * 3];
                let g = row_buf[x * 3 + 1];
                let r = row_buf[x * 3 + 2];
                pixels[dst_row_start + x] = Pixel::new(r, g, b);
            }
            debug_assert!(pixel_bytes <= stride);
        }

        Image::new(width, count, pixels)
    }
}

/// Read an entire BMP file into a canonical top-to-bottom [`Image`].
///
/// # Errors
/// Returns an error on open/parse/read failure.
pub fn read_whole(path: &Path) -> Result<Image> {
    let reader = BmpReader::open(path)?;
    reader.read_rows(0, reader.geometry().height)
}

/// Write `image` to `path` as a 24-bit BMP: bottom-to-top row order, each row
/// padded to a multiple of 4 bytes.
///
/// # Errors
/// Returns an error on an oversized image (2 GiB signed file-size limit) or a write failure.
pub fn save(path: &Path, image: &Image) -> Result<()> {
    let header = format::build_header(image.width(), image.height()).map_err(|e| {
        tracing::error!(operation = "build_header", error = %e, "failed to build output header");
        e
    })?;
    let row_stride = (image.width() * 3 + 3) & !3;
    let pixel_bytes = image.width() as usize * 3;
    let padding = row_stride as usize - pixel_bytes;

    let mut file = File::create(path).with_context(|| format!("creating output file {}", path.display())).map_err(|e| {
        tracing::error!(operation = "create", error = %e, "failed to create output file");
        e
    })?;
    file.write_all(&header).context("writing BMP header").map_err(|e| {
        tracing::error!(operation = "write_header", error = %e, "failed to write BMP header");
        e
    })?;

    let mut row_buf = vec![0u8; row_stride as usize];

    for y in (0..image.height()).rev() {
        let row = image.row(y);
        for (x, px) in row.iter().enumerate() {
            row_buf[x * 3] = px.b;
            row_buf[x * 3 + 1] = px.g;
            row_buf[x * 3 + 2] = px.r;
        }
        for b in &mut row_buf[pixel_bytes..pixel_bytes + padding] {
            *b = 0;
        }
        file.write_all(&row_buf).with_context(|| format!("writing row {y}")).map_err(|e| {
            tracing::error!(operation = "write_row", row = y, error = %e, "failed to write row");
            e
        })?;
    }
    Ok(())
}
