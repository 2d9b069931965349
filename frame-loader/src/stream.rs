//! Raw frame stream.
//!
//! The stream is a sequence of records, each made of:
//!
//! * width as a 32-bit LE integer.
//! * height as a 32-bit LE integer.
//! * pixel format code as a single byte.
//! * `width * height * bytes_per_pixel` bytes of pixel data, row by row.

use std::io::{ErrorKind, Read, Write};
use zonewatch::prelude::v1::*;

const HEADER_SIZE: usize = 9;

/// Largest pixel buffer a single record may carry.
pub const MAX_FRAME_BYTES: usize = 1 << 28;

/// Frame source reading a raw frame stream.
pub struct FrameStream<T> {
    reader: T,
}

impl<T: Read> FrameStream<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }

    /// Read a record header.
    ///
    /// Returns `None` if the stream ended right at a record boundary.
    fn read_header(&mut self) -> AnyResult<Option<[u8; HEADER_SIZE]>> {
        let mut header = [0u8; HEADER_SIZE];
        let mut filled = 0;

        while filled < header.len() {
            match self.reader.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(anyhow!("Truncated frame header")),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Some(header))
    }
}

impl<T: Read> FrameSource for FrameStream<T> {
    fn next_frame(&mut self) -> AnyResult<Option<Frame>> {
        let header = match self.read_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let width = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let height = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let format = PixelFormat::from_code(header[8])
            .ok_or_else(|| anyhow!("Unknown pixel format {}", header[8]))?;

        let size = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .filter(|&n| n <= MAX_FRAME_BYTES)
            .ok_or_else(|| anyhow!("Frame too large: {width}x{height} {format:?}"))?;

        let mut data = vec![0u8; size];
        self.reader.read_exact(&mut data)?;

        Ok(Some(Frame::new(data, width, height, format)?))
    }
}

/// Append a frame to a raw frame stream.
pub fn write_frame(out: &mut impl Write, frame: &Frame) -> AnyResult<()> {
    out.write_all(&(frame.width() as u32).to_le_bytes())?;
    out.write_all(&(frame.height() as u32).to_le_bytes())?;
    out.write_all(&[frame.format().code()])?;
    out.write_all(frame.as_bytes())?;
    Ok(())
}
