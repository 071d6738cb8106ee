// crates/imgconv-bmp/src/format.rs

//! 24-bit BMP header parsing. Bit-exact with the reference format: a 54-byte
//! header, little-endian fields at fixed offsets, 'B','M' signature.

use anyhow::{bail, Context, Result};
use std::io::Read;

/// Size in bytes of the BMP header this crate understands.
pub const HEADER_SIZE: usize = 54;

/// Geometry parsed out of a BMP header, enough to drive row-level reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpGeometry {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in rows.
    pub height: u32,
    /// Byte offset of the first pixel row in the file.
    pub data_offset: u32,
    /// Bytes per on-disk row, including padding: `ceil(width * 3 / 4) * 4`.
    pub row_stride: u32,
    /// Padding bytes appended to each row: `row_stride - width * 3`.
    pub padding: u32,
}

impl BmpGeometry {
    /// Byte offset of row `y` (0 = top of the canonical top-to-bottom image)
    /// on disk, where rows are stored bottom-to-top.
    #[must_use]
    pub fn row_offset(&self, y: u32) -> u64 {
        let from_bottom = self.height - 1 - y;
        u64::from(self.data_offset) + u64::from(from_bottom) * u64::from(self.row_stride)
    }
}

/// Parse a 54-byte BMP header, validating signature and bit depth.
///
/// # Errors
/// Returns an error if the header is truncated, the signature isn't `BM`,
/// or the bit depth isn't 24.
pub fn parse_header(header: &[u8; HEADER_SIZE]) -> Result<BmpGeometry> {
    if header[0] != b'B' || header[1] != b'M' {
        tracing::error!(operation = "parse_header", signature = ?[header[0], header[1]], "bad BMP signature");
        bail!("not a BMP file: signature bytes are {:#x},{:#x}, expected 'B','M'", header[0], header[1]);
    }

    let data_offset = read_u32_le(header, 10);
    let width = read_u32_le(header, 18);
    let height = read_u32_le(header, 22);
    let bits_per_pixel = read_u16_le(header, 28);

    if bits_per_pixel != 24 {
        tracing::error!(operation = "parse_header", bits_per_pixel, "unsupported bit depth");
        bail!("unsupported bit depth {bits_per_pixel}, only 24-bit BMP is supported");
    }
    if width == 0 || height == 0 {
        tracing::error!(operation = "parse_header", width, height, "non-positive dimensions");
        bail!("BMP header declares non-positive dimensions {width}x{height}");
    }

    let row_stride = (width * 3 + 3) & !3;
    let padding = row_stride - width * 3;

    Ok(BmpGeometry { width, height, data_offset, row_stride, padding })
}

/// Read and parse the header from an open file-like reader positioned at offset 0.
///
/// # Errors
/// Returns an error on a short read or an invalid header.
pub fn read_header<R: Read>(mut reader: R) -> Result<BmpGeometry> {
    let mut buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut buf).context("reading BMP header: truncated file").map_err(|e| {
        tracing::error!(operation = "read_header", error = %e, "truncated BMP header");
        e
    })?;
    parse_header(&buf)
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Build the 54-byte header for a `width x height` 24-bit BMP.
///
/// # Errors
/// Returns an error if the resulting file size would overflow a signed
/// 32-bit field (the original format's 2 GiB limit).
pub fn build_header(width: u32, height: u32) -> Result<[u8; HEADER_SIZE]> {
    let row_stride = (width * 3 + 3) & !3;
    let pixel_data_size = u64::from(row_stride) * u64::from(height);
    let file_size = u64::from(HEADER_SIZE as u32) + pixel_data_size;
    if file_size > i32::MAX as u64 {
        tracing::error!(operation = "build_header", file_size, "output image exceeds 2 GiB signed file-size limit");
        bail!("output image would be {file_size} bytes, exceeding the 2 GiB signed file-size limit");
    }

    let mut header = [0u8; HEADER_SIZE];
    header[0] = b'B';
    header[1] = b'M';
    header[2..6].copy_from_slice(&(file_size as u32).to_le_bytes());
    header[10..14].copy_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
    header[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size (BITMAPINFOHEADER)
    header[18..22].copy_from_slice(&width.to_le_bytes());
    header[22..26].copy_from_slice(&height.to_le_bytes());
    header[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    header[28..30].copy_from_slice(&24u16.to_le_bytes()); // bits per pixel
    header[34..38].copy_from_slice(&(pixel_data_size as u32).to_le_bytes());
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_signature() {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = b'X';
        header[1] = b'M';
        assert!(parse_header(&header).is_err());
    }

    #[test]
    fn rejects_non_24_bit() {
        let mut header = build_header(4, 4).unwrap();
        header[28..30].copy_from_slice(&32u16.to_le_bytes());
        assert!(parse_header(&header).is_err());
    }

    #[test]
    fn row_stride_includes_padding() {
        let geom = parse_header(&build_header(3, 2).unwrap()).unwrap();
        // 3 pixels * 3 bytes = 9, rounds up to 12.
        assert_eq!(geom.row_stride, 12);
        assert_eq!(geom.padding, 3);
    }

    #[test]
    fn row_offset_is_bottom_up() {
        let geom = parse_header(&build_header(1, 4).unwrap()).unwrap();
        assert_eq!(geom.row_offset(0), u64::from(geom.data_offset) + 3 * u64::from(geom.row_stride));
        assert_eq!(geom.row_offset(3), u64::from(geom.data_offset));
    }

    #[test]
    fn build_header_roundtrips_through_parse() {
        let header = build_header(640, 480).unwrap();
        let geom = parse_header(&header).unwrap();
        assert_eq!(geom.width, 640);
        assert_eq!(geom.height, 480);
        assert_eq!(geom.data_offset, HEADER_SIZE as u32);
    }
}
