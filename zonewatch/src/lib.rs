//! # Watch Zone Motion Detection Library
//!
//! This library provides a frame differencing motion detector. Changed pixels between two
//! consecutive grayscale frames are grouped into clusters, every cluster is reduced to a bounding
//! rectangle, and the rectangles are tested against a configured watch region (a grid of cells
//! or a set of line segments).
//!
//! The easiest way to use the library is to import its prelude:
//!
//! ```
//! use zonewatch::prelude::v1::*;
//! ```
//!
//! You may need [`nalgebra`](https://crates.io/crates/nalgebra) to construct line regions.

pub mod cluster;
pub mod detector;
pub mod diff;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod region;
pub mod schedule;
pub mod settings;
pub mod source;

pub mod prelude {
    pub mod v1 {
        pub use crate::{
            cluster::{Cluster, PointMetrics, ShapeClusterer},
            detector::{Alert, DetectorPhase, DetectorState, MotionDetector},
            diff::{FrameDiffer, NoiseGate},
            error::{Error, Result},
            frame::{Frame, PixelFormat, RGBA},
            geometry::{LineSegment, Rect},
            region::{GridRegion, WatchRegion},
            schedule::{Clock, FixedClock, ScheduleWindow, SystemClock, TimeOfDay},
            settings::AlertSettings,
            source::{FrameHandler, FrameSource},
        };
        pub use anyhow::{anyhow, Error as AnyError, Result as AnyResult};
    }
}
