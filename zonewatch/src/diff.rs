//! # Frame differencing

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Fraction of changed pixels above which a frame pair is considered noise.
pub const IGNORE_RATIO: f64 = 0.3;

/// Per-pixel frame comparator.
///
/// A pixel is considered changed when its new value is brighter or darker than the old value by
/// more than `sensitivity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDiffer {
    sensitivity: u32,
}

impl Default for FrameDiffer {
    fn default() -> Self {
        Self { sensitivity: 20 }
    }
}

impl FrameDiffer {
    pub fn new(sensitivity: u32) -> Self {
        Self { sensitivity }
    }

    pub fn sensitivity(&self) -> u32 {
        self.sensitivity
    }

    /// Find the indices of all changed pixels.
    ///
    /// Indices are returned in increasing order. The very first pixel of the buffer is never
    /// evaluated.
    ///
    /// # Arguments
    ///
    /// * `previous` - older of the two frames.
    /// * `current` - newer of the two frames.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] if either frame is not 8-bit grayscale, [`Error::DimensionMismatch`] if
    /// the frames differ in size.
    pub fn changed_pixels(&self, previous: &Frame, current: &Frame) -> Result<Vec<usize>> {
        let old = previous.luma8()?;
        let new = current.luma8()?;

        if previous.dim() != current.dim() {
            return Err(Error::DimensionMismatch {
                expected: previous.dim(),
                actual: current.dim(),
            });
        }

        let sensitivity = self.sensitivity as i64;

        Ok(new
            .iter()
            .zip(old)
            .enumerate()
            .skip(1)
            .filter(|&(_, (&new, &old))| {
                let (new, old) = (new as i64, old as i64);
                // Lighter or darker.
                new > old + sensitivity || new < old - sensitivity
            })
            .map(|(i, _)| i)
            .collect())
    }
}

/// Rejects frame pairs where too much of the scene changed at once.
///
/// Lighting changes and camera movement light up most of the frame; such pairs are not evaluated.
pub struct NoiseGate;

impl NoiseGate {
    /// Check whether `changed` pixels out of a `width` by `height` frame are to be ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::diff::NoiseGate;
    ///
    /// assert!(!NoiseGate::is_noise(30, 10, 10));
    /// assert!(NoiseGate::is_noise(31, 10, 10));
    /// ```
    pub fn is_noise(changed: usize, width: usize, height: usize) -> bool {
        changed as f64 > IGNORE_RATIO * (width * height) as f64
    }
}
