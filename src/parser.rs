//! Header parsing for sprite image files.

use thiserror::Error;

/// Error type for parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// File is too small to contain required header
    #[error("File too small: expected at least {expected} bytes, got {actual}")]
    FileTooSmall { expected: usize, actual: usize },
    /// File does not start with the PNG signature
    #[error("Not a PNG file")]
    BadSignature,
    /// First chunk is not `IHDR`
    #[error("Missing IHDR chunk")]
    MissingHeader,
    /// Invalid dimensions in header
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Read the pixel size of a PNG image from its header.
///
/// ## Format
///
/// - Bytes 0-7: PNG signature
/// - Bytes 8-11: IHDR chunk length (big-endian)
/// - Bytes 12-15: `IHDR`
/// - Bytes 16-19: width (u32 big-endian)
/// - Bytes 20-23: height (u32 big-endian)
///
/// Only the header is inspected; the rest of the file may be truncated.
///
/// ## Example
///
/// ```rust
/// use flipbook_core::parse_png_size;
///
/// let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
/// bytes.extend_from_slice(&13u32.to_be_bytes());
/// bytes.extend_from_slice(b"IHDR");
/// bytes.extend_from_slice(&48u32.to_be_bytes());
/// bytes.extend_from_slice(&32u32.to_be_bytes());
///
/// assert_eq!(parse_png_size(&bytes).unwrap(), (48, 32));
/// ```
pub fn parse_png_size(data: &[u8]) -> Result<(u32, u32), ParseError> {
    const HEADER_SIZE: usize = 24;

    if data.len() < HEADER_SIZE {
        return Err(ParseError::FileTooSmall {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }
    if data[0..8] != PNG_SIGNATURE {
        return Err(ParseError::BadSignature);
    }
    if &data[12..16] != b"IHDR" {
        return Err(ParseError::MissingHeader);
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    if width == 0 || height == 0 {
        return Err(ParseError::InvalidDimensions { width, height });
    }
    Ok((width, height))
}

#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}
