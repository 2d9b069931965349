//! # Time-of-day scheduling

use crate::error::{Error, Result};
use chrono::Timelike;
use std::sync::{Arc, Mutex};

/// Wall clock time with minute precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
}

impl TimeOfDay {
    pub fn new(hours: u8, minutes: u8) -> Self {
        Self { hours, minutes }
    }

    pub fn is_valid(&self) -> bool {
        self.hours < 24 && self.minutes < 60
    }
}

impl<T: Timelike> From<&T> for TimeOfDay {
    fn from(time: &T) -> Self {
        Self::new(time.hour() as u8, time.minute() as u8)
    }
}

/// Interval of the day during which alerts are evaluated.
///
/// Hours and minutes are bounded independently: a time is within the window when its hour lies
/// between the two hours and its minute lies between the two minutes. Thus `08:00 - 17:30`
/// covers `12:15`, but not `12:45`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct ScheduleWindow {
    pub from: TimeOfDay,
    pub to: TimeOfDay,
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self::all_day()
    }
}

impl ScheduleWindow {
    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Self {
        Self { from, to }
    }

    /// Window covering every minute of the day.
    pub fn all_day() -> Self {
        Self::new(TimeOfDay::new(0, 0), TimeOfDay::new(23, 59))
    }

    /// Check whether the window covers given time.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::schedule::{ScheduleWindow, TimeOfDay};
    ///
    /// let window = ScheduleWindow::new(TimeOfDay::new(8, 0), TimeOfDay::new(17, 30));
    ///
    /// assert!(window.contains(TimeOfDay::new(12, 15)));
    /// assert!(!window.contains(TimeOfDay::new(12, 45)));
    /// assert!(!window.contains(TimeOfDay::new(18, 0)));
    /// ```
    pub fn contains(&self, time: TimeOfDay) -> bool {
        (self.from.hours..=self.to.hours).contains(&time.hours)
            && (self.from.minutes..=self.to.minutes).contains(&time.minutes)
    }

    /// Reject windows with invalid times, or ones that can never contain any time.
    pub fn validate(&self) -> Result<()> {
        if !self.from.is_valid() || !self.to.is_valid() {
            return Err(Error::InvalidSettings(format!(
                "schedule window {self:?} has an invalid time"
            )));
        }

        if self.from.hours > self.to.hours || self.from.minutes > self.to.minutes {
            return Err(Error::InvalidSettings(format!(
                "schedule window {:02}:{:02} - {:02}:{:02} never matches",
                self.from.hours, self.from.minutes, self.to.hours, self.to.minutes
            )));
        }

        Ok(())
    }
}

/// Check whether any of the windows covers given time.
pub fn in_schedule(windows: &[ScheduleWindow], time: TimeOfDay) -> bool {
    windows.iter().any(|w| w.contains(time))
}

/// Source of the current time of day.
pub trait Clock {
    fn now(&self) -> TimeOfDay;
}

/// Local wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        TimeOfDay::from(&chrono::Local::now())
    }
}

/// Manually set clock.
///
/// Clones share the same time, so a clock handed to a detector can still be moved from outside.
#[derive(Clone, Debug, Default)]
pub struct FixedClock(Arc<Mutex<TimeOfDay>>);

impl FixedClock {
    pub fn new(time: TimeOfDay) -> Self {
        Self(Arc::new(Mutex::new(time)))
    }

    pub fn set(&self, time: TimeOfDay) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimeOfDay {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}
