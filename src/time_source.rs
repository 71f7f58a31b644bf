//! Duration resolution from the preset slider or the custom hours/minutes fields

use serde::{Deserialize, Serialize};

/// Upper bound of the preset slider, in minutes
pub const MAX_MINUTES: u32 = 180;

/// Slider values always land on a multiple of this many minutes
pub const SNAP_INTERVAL: u32 = 30;

/// Which input produces the requested duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Bounded slider snapped to `SNAP_INTERVAL`
    Preset,
    /// Free-form hours and minutes
    Custom,
}

/// Snap a raw slider position to the nearest multiple of `SNAP_INTERVAL`.
///
/// Values outside `[0, MAX_MINUTES]` are clamped first. Halfway values round up.
pub fn snap_slider(raw: i64) -> u32 {
    let clamped = raw.clamp(0, MAX_MINUTES as i64) as u32;
    (clamped + SNAP_INTERVAL / 2) / SNAP_INTERVAL * SNAP_INTERVAL
}

/// Parse a custom input field. Anything negative or non-numeric counts as 0.
pub fn parse_field(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Resolve the requested duration in minutes for the given source
pub fn resolve_minutes(source: TimeSource, slider: u32, hours: u32, minutes: u32) -> u32 {
    match source {
        TimeSource::Preset => snap_slider(slider as i64),
        TimeSource::Custom => hours.saturating_mul(60).saturating_add(minutes),
    }
}

/// Current contents of both duration inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationInput {
    source: TimeSource,
    slider: u32,
    custom_hours: u32,
    custom_minutes: u32,
}

impl DurationInput {
    /// Start in preset mode with the slider on the first tick mark
    pub fn new() -> Self {
        Self {
            source: TimeSource::Preset,
            slider: SNAP_INTERVAL,
            custom_hours: 0,
            custom_minutes: 0,
        }
    }

    pub fn source(&self) -> TimeSource {
        self.source
    }

    pub fn slider(&self) -> u32 {
        self.slider
    }

    pub fn custom(&self) -> (u32, u32) {
        (self.custom_hours, self.custom_minutes)
    }

    /// Switch the active source. Custom fields go back to zero so a value typed
    /// before the switch never leaks into the next request; the slider keeps
    /// its position.
    pub fn switch_source(&mut self, source: TimeSource) {
        if self.select_source(source) {
            self.custom_hours = 0;
            self.custom_minutes = 0;
        }
    }

    /// Switch the active source leaving every field untouched. Returns whether
    /// the source changed.
    pub fn select_source(&mut self, source: TimeSource) -> bool {
        if self.source == source {
            return false;
        }
        self.source = source;
        true
    }

    /// Move the slider, returning the snapped position
    pub fn set_slider(&mut self, raw: i64) -> u32 {
        self.slider = snap_slider(raw);
        self.slider
    }

    /// Replace the custom fields from raw text
    pub fn set_custom(&mut self, hours: &str, minutes: &str) {
        self.custom_hours = parse_field(hours);
        self.custom_minutes = parse_field(minutes);
    }

    /// Duration in minutes from whichever source is active
    pub fn resolve(&self) -> u32 {
        resolve_minutes(self.source, self.slider, self.custom_hours, self.custom_minutes)
    }
}

impl Default for DurationInput {
    fn default() -> Self {
        Self::new()
    }
}
