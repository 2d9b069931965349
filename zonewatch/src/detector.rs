//! # Motion alert detector
//!
//! The detector keeps the previous frame around and compares every new frame against it. In alert
//! mode, motion in the watch region raises an alert and forgets both frames, so that the next
//! frame starts a fresh comparison. In tracking mode, motion rectangles are only recomputed for
//! display.

use crate::cluster::ShapeClusterer;
use crate::diff::{FrameDiffer, NoiseGate};
use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::Rect;
use crate::schedule::{in_schedule, Clock, SystemClock};
use crate::settings::AlertSettings;
use crate::source::FrameHandler;
use log::*;

/// Callback invoked for every raised alert.
pub type Subscriber = Box<dyn FnMut() + Send>;

/// Motion alert raised by a single frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// How many times the alert signal was raised.
    ///
    /// Every active grid cell or line hit by motion raises the signal once.
    pub count: usize,
    /// Motion rectangles that caused the alert.
    pub rects: Vec<Rect>,
}

/// Whether the detector has a frame to compare against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorPhase {
    AwaitingFirstFrame,
    Ready,
}

/// Frame buffer and last results of a detector.
#[derive(Clone, Debug, Default)]
pub struct DetectorState {
    previous: Option<Frame>,
    current: Option<Frame>,
    rects: Vec<Rect>,
    dim: (usize, usize),
}

impl DetectorState {
    pub fn phase(&self) -> DetectorPhase {
        match self.previous {
            Some(_) => DetectorPhase::Ready,
            None => DetectorPhase::AwaitingFirstFrame,
        }
    }

    /// Motion rectangles of the last evaluation.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Dimensions established by the first frame of the session.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn previous(&self) -> Option<&Frame> {
        self.previous.as_ref()
    }

    /// Start a new session with `frame` as the reference.
    fn establish(&mut self, frame: Frame) {
        self.dim = frame.dim();
        self.previous = Some(frame);
        self.current = None;
        self.rects.clear();
    }

    /// Forget both frames.
    fn reset(&mut self) {
        self.previous = None;
        self.current = None;
    }

    /// Make the current frame the reference of the next comparison.
    fn roll(&mut self) {
        if let Some(current) = self.current.take() {
            self.previous = Some(current);
        }
    }

    /// Store the arriving frame.
    ///
    /// Returns `false` if the frame started a new session instead, and there is nothing to
    /// compare it against.
    fn push(&mut self, frame: &Frame) -> bool {
        match self.phase() {
            DetectorPhase::AwaitingFirstFrame => {
                debug!("baseline frame {:?}", frame.dim());
                self.establish(frame.clone());
                false
            }
            DetectorPhase::Ready if frame.dim() != self.dim => {
                debug!("frame size changed {:?} -> {:?}", self.dim, frame.dim());
                self.establish(frame.clone());
                false
            }
            DetectorPhase::Ready => {
                self.current = Some(frame.clone());
                true
            }
        }
    }
}

/// Frame differencing motion detector.
pub struct MotionDetector<C = SystemClock> {
    settings: AlertSettings,
    differ: FrameDiffer,
    clusterer: ShapeClusterer,
    clock: C,
    state: DetectorState,
    subscribers: Vec<Subscriber>,
}

impl MotionDetector {
    /// Create a new detector on the local wall clock.
    pub fn new(settings: AlertSettings) -> Result<Self> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> MotionDetector<C> {
    /// Create a new detector with a custom clock.
    ///
    /// # Arguments
    ///
    /// * `settings` - alert settings, validated before use.
    /// * `clock` - source of the time of day for schedule checks.
    pub fn with_clock(settings: AlertSettings, clock: C) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            differ: FrameDiffer::new(settings.sensitivity),
            clusterer: ShapeClusterer::default(),
            settings,
            clock,
            state: Default::default(),
            subscribers: vec![],
        })
    }

    /// Register a callback to be invoked on every alert signal.
    pub fn subscribe(&mut self, subscriber: impl FnMut() + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    /// Replace the settings.
    ///
    /// Frames in the buffer are kept.
    pub fn set_settings(&mut self, settings: AlertSettings) -> Result<()> {
        settings.validate()?;
        self.differ = FrameDiffer::new(settings.sensitivity);
        self.settings = settings;
        Ok(())
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn phase(&self) -> DetectorPhase {
        self.state.phase()
    }

    /// Motion rectangles of the last evaluation.
    pub fn rectangles(&self) -> &[Rect] {
        self.state.rects()
    }

    /// Compute motion rectangles between two frames.
    ///
    /// Returns no rectangles if too much of the frame changed.
    ///
    /// # Arguments
    ///
    /// * `previous` - older of the two frames.
    /// * `current` - newer of the two frames.
    pub fn evaluate(&self, previous: &Frame, current: &Frame) -> Result<Vec<Rect>> {
        let changed = self.differ.changed_pixels(previous, current)?;
        let (width, height) = current.dim();

        trace!("{} changed pixels", changed.len());

        if NoiseGate::is_noise(changed.len(), width, height) {
            debug!(
                "ignoring {} changed pixels out of {}",
                changed.len(),
                width * height
            );
            return Ok(vec![]);
        }

        Ok(self.clusterer.rectangles(&changed, width))
    }

    /// Evaluate the buffered frame pair, leaving the buffer untouched on failure.
    fn evaluate_buffered(&mut self) -> Result<()> {
        let rects = match (&self.state.previous, &self.state.current) {
            (Some(previous), Some(current)) => self.evaluate(previous, current),
            _ => Ok(vec![]),
        };

        match rects {
            Ok(rects) => {
                self.state.rects = rects;
                Ok(())
            }
            Err(e) => {
                self.state.current = None;
                Err(e)
            }
        }
    }

    /// Process a frame in alert mode.
    ///
    /// Frames are ignored while the detector is not active. Otherwise, motion is evaluated if the
    /// current time lies within the schedule, and an alert is returned if it hits the watch
    /// region. Raising an alert clears the frame buffer.
    ///
    /// # Errors
    ///
    /// [`Error::Format`](crate::error::Error::Format) if the frame is not 8-bit grayscale. The
    /// detector state is left untouched.
    pub fn alert(&mut self, frame: &Frame) -> Result<Option<Alert>> {
        if !self.settings.is_active {
            return Ok(None);
        }

        frame.luma8()?;

        if !self.state.push(frame) {
            return Ok(None);
        }

        let now = self.clock.now();

        if !in_schedule(&self.settings.schedule, now) {
            debug!("{:02}:{:02} is outside the schedule", now.hours, now.minutes);
            self.state.roll();
            return Ok(None);
        }

        self.evaluate_buffered()?;

        let (width, height) = self.state.dim;
        let count = self
            .settings
            .region
            .matches(&self.state.rects, width, height);

        if count == 0 {
            self.state.roll();
            return Ok(None);
        }

        debug!("motion in {count} parts of the watch region");

        for _ in 0..count {
            self.subscribers.iter_mut().for_each(|s| s());
        }

        self.state.reset();

        Ok(Some(Alert {
            count,
            rects: self.state.rects.clone(),
        }))
    }

    /// Process a frame in tracking mode.
    ///
    /// Motion rectangles are recomputed regardless of the active flag and the schedule, and no
    /// alerts are raised.
    ///
    /// # Errors
    ///
    /// On failure the rectangles of the previous evaluation are kept, and it is up to the caller
    /// to decide whether to report the error or carry on.
    pub fn track(&mut self, frame: &Frame) -> Result<&[Rect]> {
        frame.luma8()?;

        if self.state.push(frame) {
            self.evaluate_buffered()?;
            self.state.roll();
        }

        Ok(self.state.rects())
    }
}

impl<C: Clock> FrameHandler for MotionDetector<C> {
    type Output = Option<Alert>;

    fn on_frame(&mut self, frame: &Frame) -> Result<Option<Alert>> {
        self.alert(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frame::PixelFormat;
    use crate::region::{GridRegion, WatchRegion};
    use crate::schedule::{FixedClock, ScheduleWindow, TimeOfDay};
    use nalgebra as na;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SENSITIVITY: u32 = 20;

    fn background() -> Frame {
        Frame::filled(100, 100, 100)
    }

    /// 100x100 frame with a 20x20 block raised above the background.
    fn with_block(x: usize, y: usize) -> Frame {
        let mut data = background().as_bytes().to_vec();

        for row in y..y + 20 {
            for col in x..x + 20 {
                data[row * 100 + col] += SENSITIVITY as u8 + 5;
            }
        }

        Frame::luma(data, 100, 100).unwrap()
    }

    fn grid_settings(active: &[(usize, usize)]) -> AlertSettings {
        let grid = active
            .iter()
            .fold(GridRegion::new(2, 2), |g, &(c, r)| g.with_active(c, r));

        AlertSettings::default()
            .sensitivity(SENSITIVITY)
            .region(WatchRegion::Grid(grid))
    }

    fn detector(settings: AlertSettings) -> (MotionDetector<FixedClock>, Arc<AtomicUsize>) {
        let clock = FixedClock::new(TimeOfDay::new(12, 0));
        let mut detector = MotionDetector::with_clock(settings, clock).unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        detector.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        (detector, fired)
    }

    #[test]
    fn first_frame_is_baseline() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 0)]));

        assert_eq!(detector.phase(), DetectorPhase::AwaitingFirstFrame);
        assert_eq!(detector.alert(&with_block(0, 0)).unwrap(), None);
        assert_eq!(detector.phase(), DetectorPhase::Ready);
        assert_eq!(detector.state().dim(), (100, 100));
        assert!(detector.rectangles().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn block_in_active_cell() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 1)]));

        assert_eq!(detector.alert(&background()).unwrap(), None);

        let alert = detector.alert(&with_block(10, 50)).unwrap().unwrap();

        assert_eq!(alert.count, 1);
        assert_eq!(alert.rects, vec![Rect::new(10, 50, 19, 19)]);
        assert_eq!(detector.rectangles(), &[Rect::new(10, 50, 19, 19)]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(detector.phase(), DetectorPhase::AwaitingFirstFrame);

        // Buffer was reset, so the next frame only establishes a baseline.
        assert_eq!(detector.alert(&background()).unwrap(), None);
        assert_eq!(detector.phase(), DetectorPhase::Ready);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn block_outside_active_cell() {
        let (mut detector, fired) = detector(grid_settings(&[(1, 0)]));

        detector.alert(&background()).unwrap();

        assert_eq!(detector.alert(&with_block(10, 50)).unwrap(), None);
        assert_eq!(detector.rectangles(), &[Rect::new(10, 50, 19, 19)]);
        assert_eq!(detector.phase(), DetectorPhase::Ready);

        // The moved frame became the reference.
        assert_eq!(detector.alert(&with_block(10, 50)).unwrap(), None);
        assert!(detector.rectangles().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fires_per_cell() {
        let all = [(0, 0), (0, 1), (1, 0), (1, 1)];
        let (mut detector, fired) = detector(grid_settings(&all));

        detector.alert(&background()).unwrap();
        let alert = detector.alert(&with_block(40, 40)).unwrap().unwrap();

        assert_eq!(alert.count, 4);
        assert_eq!(fired.load(Ordering::SeqCst), 4);
        assert_eq!(detector.phase(), DetectorPhase::AwaitingFirstFrame);
    }

    #[test]
    fn line_region() {
        let settings = AlertSettings::default()
            .sensitivity(SENSITIVITY)
            .region(WatchRegion::Lines(vec![
                crate::geometry::LineSegment::new(
                    na::Point2::new(0.0, 60.0),
                    na::Point2::new(100.0, 60.0),
                ),
                crate::geometry::LineSegment::new(
                    na::Point2::new(90.0, 0.0),
                    na::Point2::new(90.0, 100.0),
                ),
            ]));
        let (mut detector, fired) = detector(settings);

        detector.alert(&background()).unwrap();
        let alert = detector.alert(&with_block(10, 50)).unwrap().unwrap();

        assert_eq!(alert.count, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn inactive_ignores_frames() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 1)]).active(false));

        for frame in [background(), with_block(10, 50), background()] {
            assert_eq!(detector.alert(&frame).unwrap(), None);
        }

        assert_eq!(detector.phase(), DetectorPhase::AwaitingFirstFrame);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn outside_schedule_still_rolls() {
        let window = ScheduleWindow::new(TimeOfDay::new(8, 0), TimeOfDay::new(17, 30));
        let clock = FixedClock::new(TimeOfDay::new(12, 45));
        let settings = grid_settings(&[(0, 1)]).schedule(vec![window]);
        let mut detector = MotionDetector::with_clock(settings, clock.clone()).unwrap();

        detector.alert(&background()).unwrap();
        assert_eq!(detector.alert(&with_block(10, 50)).unwrap(), None);
        assert!(detector.rectangles().is_empty());
        assert_eq!(detector.phase(), DetectorPhase::Ready);

        // Back in schedule, but the block is already in the reference frame.
        clock.set(TimeOfDay::new(12, 15));
        assert_eq!(detector.alert(&with_block(10, 50)).unwrap(), None);

        assert!(detector.alert(&background()).unwrap().is_some());
    }

    #[test]
    fn global_change_ignored() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 0), (1, 1)]));

        detector.track(&background()).unwrap();
        assert!(!detector.track(&with_block(10, 50)).unwrap().is_empty());

        assert!(detector.track(&Frame::filled(100, 100, 250)).unwrap().is_empty());

        detector.alert(&Frame::filled(100, 100, 0)).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrong_format_rejected() {
        let (mut detector, _) = detector(grid_settings(&[(0, 1)]));
        let rgb = Frame::new(vec![0; 100 * 100 * 3], 100, 100, PixelFormat::Rgb8).unwrap();

        assert_eq!(detector.alert(&rgb), Err(Error::Format(PixelFormat::Rgb8)));
        assert_eq!(detector.phase(), DetectorPhase::AwaitingFirstFrame);

        detector.alert(&background()).unwrap();

        assert_eq!(detector.alert(&rgb), Err(Error::Format(PixelFormat::Rgb8)));
        assert_eq!(detector.state().previous(), Some(&background()));
    }

    #[test]
    fn size_change_resets() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 0), (0, 1), (1, 0), (1, 1)]));

        detector.alert(&background()).unwrap();
        assert_eq!(detector.alert(&Frame::filled(50, 40, 0)).unwrap(), None);

        assert_eq!(detector.phase(), DetectorPhase::Ready);
        assert_eq!(detector.state().dim(), (50, 40));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tracking_never_resets() {
        let (mut detector, fired) = detector(grid_settings(&[(0, 1)]).active(false));

        assert!(detector.track(&background()).unwrap().is_empty());
        assert_eq!(
            detector.track(&with_block(10, 50)).unwrap(),
            &[Rect::new(10, 50, 19, 19)]
        );

        assert_eq!(detector.phase(), DetectorPhase::Ready);
        assert_eq!(detector.state().previous(), Some(&with_block(10, 50)));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tracking_ignores_schedule() {
        let window = ScheduleWindow::new(TimeOfDay::new(8, 0), TimeOfDay::new(9, 0));
        let clock = FixedClock::new(TimeOfDay::new(23, 30));
        let settings = grid_settings(&[(0, 1)]).schedule(vec![window]);
        let mut detector = MotionDetector::with_clock(settings, clock).unwrap();

        assert!(detector.track(&background()).unwrap().is_empty());
        assert_eq!(
            detector.track(&with_block(10, 50)).unwrap(),
            &[Rect::new(10, 50, 19, 19)]
        );
        assert_eq!(detector.state().previous(), Some(&with_block(10, 50)));

        // Same frames in alert mode are never evaluated.
        let mut detector = MotionDetector::with_clock(
            detector.settings().clone(),
            FixedClock::new(TimeOfDay::new(23, 30)),
        )
        .unwrap();
        detector.alert(&background()).unwrap();
        assert_eq!(detector.alert(&with_block(10, 50)).unwrap(), None);
        assert!(detector.rectangles().is_empty());
    }

    #[test]
    fn tracking_failure_keeps_rects() {
        let (mut detector, _) = detector(grid_settings(&[]));
        let rgba = Frame::new(vec![0; 100 * 100 * 4], 100, 100, PixelFormat::Rgba8).unwrap();

        detector.track(&background()).unwrap();
        detector.track(&with_block(60, 10)).unwrap();
        let before = detector.rectangles().to_vec();

        assert!(detector.track(&rgba).is_err());
        assert_eq!(detector.rectangles(), &before[..]);
        assert!(!before.is_empty());
    }

    #[test]
    fn frame_handler_port() {
        fn feed<H: FrameHandler>(handler: &mut H, frames: &[Frame]) -> Vec<H::Output> {
            frames.iter().map(|f| handler.on_frame(f).unwrap()).collect()
        }

        let (mut detector, _) = detector(grid_settings(&[(0, 1)]));

        let out = feed(&mut detector, &[background(), with_block(10, 50)]);

        assert_eq!(out[0], None);
        assert_eq!(out[1].as_ref().map(|a| a.count), Some(1));
    }

    #[test]
    fn invalid_settings_rejected() {
        let settings = AlertSettings::default().region(WatchRegion::Grid(GridRegion::new(0, 0)));
        assert!(MotionDetector::new(settings).is_err());
    }
}
