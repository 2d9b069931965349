//! # Video frames

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};

/// Weights of the BT.709 luma transform.
const LUMA_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Layout of a single pixel within a frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum PixelFormat {
    /// 8-bit grayscale. The only format the detector works on.
    Luma8,
    /// 16-bit little endian grayscale.
    Luma16,
    /// 8-bit red, green, blue.
    Rgb8,
    /// 8-bit red, green, blue, alpha.
    Rgba8,
}

impl PixelFormat {
    /// Number of bytes one pixel occupies.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Luma8 => 1,
            Self::Luma16 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    /// Numeric code of the format, as used by serialized frame streams.
    pub fn code(self) -> u8 {
        match self {
            Self::Luma8 => 0,
            Self::Luma16 => 1,
            Self::Rgb8 => 2,
            Self::Rgba8 => 3,
        }
    }

    /// Parse a numeric format code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Luma8),
            1 => Some(Self::Luma16),
            2 => Some(Self::Rgb8),
            3 => Some(Self::Rgba8),
            _ => None,
        }
    }
}

/// RGBA colour structure.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RGBA {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RGBA {
    /// Convert from a slice containing `[r, g, b]` elements.
    pub fn from_rgb_slice(rgb: &[u8]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 255,
        }
    }

    /// Grayscale value of the colour.
    ///
    /// Alpha is ignored.
    pub fn luma(&self) -> u8 {
        let [wr, wg, wb] = LUMA_WEIGHTS;
        (wr * self.r as f32 + wg * self.g as f32 + wb * self.b as f32) as u8
    }
}

/// Immutable pixel buffer of a single video frame.
///
/// Pixels are stored row by row, without any padding between rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl Frame {
    /// Create a new frame.
    ///
    /// # Arguments
    ///
    /// * `data` - pixel data, row by row.
    /// * `width` - width of the frame in pixels.
    /// * `height` - height of the frame in pixels.
    /// * `format` - layout of every pixel in `data`.
    pub fn new(data: Vec<u8>, width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        let expected = width * height * format.bytes_per_pixel();

        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Create a new 8-bit grayscale frame.
    pub fn luma(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, PixelFormat::Luma8)
    }

    /// Create a grayscale frame with every pixel set to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::frame::Frame;
    ///
    /// let frame = Frame::filled(4, 3, 7);
    ///
    /// assert_eq!(frame.dim(), (4, 3));
    /// assert!(frame.as_bytes().iter().all(|&v| v == 7));
    /// ```
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
            format: PixelFormat::Luma8,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get width and height of the frame.
    pub fn dim(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of pixels in the frame.
    ///
    /// This is the same as `width * height`
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Grayscale pixel values.
    ///
    /// Fails with [`Error::Format`] if the frame is not [`PixelFormat::Luma8`].
    pub fn luma8(&self) -> Result<&[u8]> {
        match self.format {
            PixelFormat::Luma8 => Ok(&self.data),
            format => Err(Error::Format(format)),
        }
    }

    /// Convert the frame to 8-bit grayscale.
    ///
    /// Colour frames are weighted with BT.709 coefficients, 16-bit frames keep their most
    /// significant byte.
    pub fn to_luma8(&self) -> Frame {
        let data = match self.format {
            PixelFormat::Luma8 => self.data.clone(),
            PixelFormat::Luma16 => self
                .data
                .chunks_exact(2)
                .map(|v| u16::from_le_bytes([v[0], v[1]]).to_be_bytes()[0])
                .collect(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .map(|rgb| RGBA::from_rgb_slice(rgb).luma())
                .collect(),
            PixelFormat::Rgba8 => bytemuck::cast_slice::<_, RGBA>(&self.data[..])
                .iter()
                .map(RGBA::luma)
                .collect(),
        };

        Frame {
            data,
            width: self.width,
            height: self.height,
            format: PixelFormat::Luma8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_checked() {
        let err = Frame::new(vec![0; 11], 2, 2, PixelFormat::Rgb8).unwrap_err();
        assert_eq!(
            err,
            Error::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn luma8_rejects_colour() {
        let frame = Frame::new(vec![0; 16], 2, 2, PixelFormat::Rgba8).unwrap();
        assert!(frame.luma8().unwrap_err().is_format());
    }

    #[test]
    fn rgb_to_luma() {
        let frame = Frame::new(
            vec![255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 0],
            4,
            1,
            PixelFormat::Rgb8,
        )
        .unwrap();

        let luma = frame.to_luma8();

        assert_eq!(luma.format(), PixelFormat::Luma8);
        assert_eq!(luma.as_bytes()[1], 0);
        assert_eq!(luma.as_bytes()[2], 54);
        assert_eq!(luma.as_bytes()[3], 182);
        assert!(luma.as_bytes()[0] >= 254);
    }

    #[test]
    fn rgba_matches_rgb() {
        let rgb = Frame::new(vec![10, 200, 30, 90, 90, 90], 2, 1, PixelFormat::Rgb8).unwrap();
        let rgba = Frame::new(
            vec![10, 200, 30, 0, 90, 90, 90, 255],
            2,
            1,
            PixelFormat::Rgba8,
        )
        .unwrap();

        assert_eq!(rgb.to_luma8(), rgba.to_luma8());
    }

    #[test]
    fn luma16_keeps_high_byte() {
        let frame = Frame::new(
            [0x1234u16, 0xff00]
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect(),
            2,
            1,
            PixelFormat::Luma16,
        )
        .unwrap();

        assert_eq!(frame.to_luma8().as_bytes(), &[0x12, 0xff]);
    }

    #[test]
    fn unknown_format_code() {
        assert_eq!(PixelFormat::from_code(2), Some(PixelFormat::Rgb8));
        assert_eq!(PixelFormat::from_code(4), None);
    }
}
