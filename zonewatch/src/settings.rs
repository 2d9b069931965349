//! # Alert settings

#[cfg(feature = "serde")]
use crate::error::Error;
use crate::error::Result;
use crate::region::WatchRegion;
use crate::schedule::ScheduleWindow;

/// Configuration of a single motion alert detector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlertSettings {
    /// How much a pixel needs to change, in grayscale levels, to be considered changed.
    pub sensitivity: u32,
    /// Master switch of alert evaluation.
    pub is_active: bool,
    /// Times of day during which alerts are evaluated.
    pub schedule: Vec<ScheduleWindow>,
    /// Area to watch.
    pub region: WatchRegion,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            sensitivity: 20,
            is_active: true,
            schedule: vec![ScheduleWindow::all_day()],
            region: Default::default(),
        }
    }
}

impl AlertSettings {
    pub fn sensitivity(self, sensitivity: u32) -> Self {
        Self {
            sensitivity,
            ..self
        }
    }

    pub fn active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }

    pub fn schedule(self, schedule: Vec<ScheduleWindow>) -> Self {
        Self { schedule, ..self }
    }

    pub fn region(self, region: WatchRegion) -> Self {
        Self { region, ..self }
    }

    /// Check that the settings describe a usable detector.
    pub fn validate(&self) -> Result<()> {
        self.region.validate()?;
        self.schedule.iter().try_for_each(ScheduleWindow::validate)
    }

    /// Parse and validate settings from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// Serialize settings to pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSettings(e.to_string()))
    }
}
