//! Directories of still images.

use log::*;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use zonewatch::prelude::v1::*;

/// File extensions picked up from a directory.
const EXTENSIONS: &[&str] = &["pgm", "png"];

/// Frame source reading a directory of grayscale images.
///
/// Images are read in file name order and converted to 8-bit luma.
pub struct ImageSequence {
    files: VecDeque<PathBuf>,
}

impl ImageSequence {
    /// List all `.pgm` and `.png` files in a directory.
    pub fn open(dir: impl AsRef<Path>) -> AnyResult<Self> {
        let mut files = std::fs::read_dir(dir.as_ref())?
            .map(|e| e.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;

        files.retain(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| {
                    EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext))
                })
        });
        files.sort();

        debug!("{} images in {}", files.len(), dir.as_ref().display());

        Ok(Self {
            files: files.into(),
        })
    }

    /// Number of images not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> AnyResult<Option<Frame>> {
        let path = match self.files.pop_front() {
            Some(path) => path,
            None => return Ok(None),
        };

        let data = std::fs::read(&path)?;

        decode_image(&data)
            .map(Some)
            .map_err(|e| e.context(format!("Failed to decode {}", path.display())))
    }
}

/// Decode an encoded image into an 8-bit grayscale frame.
pub fn decode_image(data: &[u8]) -> AnyResult<Frame> {
    let img = image::load_from_memory(data)?.into_luma8();
    let (width, height) = img.dimensions();

    Ok(Frame::luma(img.into_raw(), width as usize, height as usize)?)
}
