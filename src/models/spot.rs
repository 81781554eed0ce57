use crate::text::{leading_float, truncate_chars};
use std::fmt;

/// Longest callsign kept for the spotted station and the spotter
pub const CALLSIGN_MAX_LEN: usize = 11;
/// Longest frequency text kept, e.g. "14074.0"
pub const FREQUENCY_MAX_LEN: usize = 9;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Operating mode inferred from a spot line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotMode {
    Ft8,
    Ft4,
    Ssb,
    Cw,
    Unknown,
}

impl SpotMode {
    /// Short tag shown in the spot list (at most 4 characters)
    pub fn as_str(self) -> &'static str {
        match self {
            SpotMode::Ft8 => "FT8",
            SpotMode::Ft4 => "FT4",
            SpotMode::Ssb => "SSB",
            SpotMode::Cw => "CW",
            SpotMode::Unknown => "-",
        }
    }
}

impl fmt::Display for SpotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded DX spot as announced by the telnet feed
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    pub callsign: String,
    /// Frequency exactly as sent by the feed, in kHz
    pub frequency: String,
    pub frequency_khz: f64,
    pub spotter: String,
    pub hour: u8,
    pub minute: u8,
    pub mode: SpotMode,
}

impl Spot {
    /// Build a spot, truncating the text fields to their display limits
    pub fn new(
        spotter: &str,
        frequency: &str,
        callsign: &str,
        hour: u8,
        minute: u8,
        mode: SpotMode,
    ) -> Self {
        let frequency = truncate_chars(frequency, FREQUENCY_MAX_LEN);
        Self {
            callsign: truncate_chars(callsign, CALLSIGN_MAX_LEN),
            frequency_khz: leading_float(&frequency),
            frequency,
            spotter: truncate_chars(spotter, CALLSIGN_MAX_LEN),
            hour,
            minute,
            mode,
        }
    }

    /// UTC time of the spot as seconds since midnight
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60
    }

    /// Seconds between the spot and `now_seconds_of_day` (UTC).
    /// A spot from "later today" is taken to be from yesterday.
    pub fn elapsed_seconds(&self, now_seconds_of_day: u32) -> u32 {
        let now = now_seconds_of_day % SECONDS_PER_DAY;
        let spot = self.seconds_of_day();
        if now >= spot {
            now - spot
        } else {
            now + SECONDS_PER_DAY - spot
        }
    }

    /// Format for the spot list: "ELAPSED CALL MODE FREQ"
    /// Example: "  3m K1ABC       FT8   14074.0"
    pub fn to_display_string(&self, now_seconds_of_day: u32) -> String {
        format!(
            "{:>4} {:<11} {:<4} {:>9}",
            format_elapsed_minutes(self.elapsed_seconds(now_seconds_of_day)),
            self.callsign,
            self.mode.as_str(),
            self.frequency
        )
    }
}

/// Whole minutes since the spot, e.g. "15m"
pub fn format_elapsed_minutes(elapsed_seconds: u32) -> String {
    format!("{}m", elapsed_seconds / 60)
}
