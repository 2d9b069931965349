//! # Frame input ports

use crate::frame::Frame;

/// Source of video frames.
///
/// This is implemented by whatever acquires and decodes frames, be it a camera or a recording.
pub trait FrameSource {
    /// Get the next frame in the stream.
    ///
    /// Returns `Ok(None)` once the stream is exhausted, and `Err` if the frame could not be read.
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;

    /// Get the framerate of the stream.
    ///
    /// This will return `Some(framerate)` if it is known. On realtime streams it may
    /// not always be known. In such cases, `None` is returned.
    fn get_framerate(&self) -> Option<f64> {
        None
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        (**self).next_frame()
    }

    fn get_framerate(&self) -> Option<f64> {
        (**self).get_framerate()
    }
}

/// Receiver of newly arrived frames.
///
/// The handler is invoked once per frame, and every invocation completes before the next frame is
/// handed over. Frames are borrowed, handlers clone whatever they need to keep.
pub trait FrameHandler {
    type Output;

    /// Process a single frame in the stream.
    fn on_frame(&mut self, frame: &Frame) -> crate::error::Result<Self::Output>;
}
