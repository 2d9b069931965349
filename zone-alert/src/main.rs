//! Watch a frame sequence for motion in the configured zones.

use log::*;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zonewatch::prelude::v1::*;

fn main() -> AnyResult<()> {
    env_logger::init();

    let settings = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Please supply a settings file!"))?;

    let input = std::env::args()
        .nth(2)
        .ok_or_else(|| anyhow!("Please supply a frame source!"))?;

    let passive = match std::env::args().nth(3).as_deref() {
        None => false,
        Some("passive") => true,
        Some(mode) => return Err(anyhow!("Unknown mode {mode}")),
    };

    let settings = AlertSettings::load(&settings)?;
    let mut source = frame_loader::create_source(&input)?;

    if let Some(fps) = source.get_framerate() {
        info!("Source framerate: {fps}");
    }

    let mut detector = MotionDetector::new(settings)?;

    let frames = if passive {
        track(&mut source, &mut detector)?
    } else {
        let signals = Arc::new(AtomicUsize::new(0));
        let counter = signals.clone();
        detector.subscribe(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let frames = watch(&mut source, &mut detector)?;
        info!("{} alert signals raised", signals.load(Ordering::Relaxed));
        frames
    };

    info!("Processed {frames} frames");

    Ok(())
}

/// Detector input must be 8-bit luma.
fn to_luma(frame: &Frame) -> Cow<Frame> {
    match frame.format() {
        PixelFormat::Luma8 => Cow::Borrowed(frame),
        _ => Cow::Owned(frame.to_luma8()),
    }
}

/// Hand every frame to an alerting handler.
fn watch<H: FrameHandler<Output = Option<Alert>>>(
    source: &mut impl FrameSource,
    handler: &mut H,
) -> AnyResult<usize> {
    let mut frame_num = 0;

    while let Some(frame) = source.next_frame()? {
        match handler.on_frame(&to_luma(&frame)) {
            Ok(Some(alert)) => info!(
                "Frame {frame_num}: alert x{} ({:?})",
                alert.count, alert.rects
            ),
            Ok(None) => {}
            Err(e) => error!("Frame {frame_num}: {e}"),
        }
        frame_num += 1;
    }

    Ok(frame_num)
}

/// Only track motion, never raising alerts.
fn track<C: Clock>(
    source: &mut impl FrameSource,
    detector: &mut MotionDetector<C>,
) -> AnyResult<usize> {
    let mut frame_num = 0;

    while let Some(frame) = source.next_frame()? {
        match detector.track(&to_luma(&frame)) {
            Ok(rects) if !rects.is_empty() => info!("Frame {frame_num}: {rects:?}"),
            Ok(_) => {}
            Err(e) => warn!("Frame {frame_num}: {e}"),
        }
        frame_num += 1;
    }

    Ok(frame_num)
}
