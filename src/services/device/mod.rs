//! Hardware-facing collaborators: display, speaker, power and touch
//!
//! The core only talks to the panel and the board through these traits.
//! Host builds use the console and no-op versions.

mod console;
mod noop;

pub use console::{BellAudio, ConsoleRenderer};
pub use noop::{NoOpPowerControl, NoOpUpdateChecker, NoTouchInput};

use super::session::FeedStatus;
use super::spot_store::SpotStore;
use crate::config::AudioConfig;
use crate::models::{PropagationSnapshot, Screen};
use std::time::Duration;

/// Everything a renderer needs to draw the active screen
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a> {
    pub screen: Screen,
    pub spots: &'a SpotStore,
    pub propagation: &'a PropagationSnapshot,
    pub propagation_available: bool,
    pub feed_status: FeedStatus,
    /// UTC seconds since midnight, for the elapsed column
    pub utc_seconds_of_day: u32,
    pub grace_remaining: Option<Duration>,
    /// Newer firmware tag reported by the update check
    pub new_version: Option<&'a str>,
}

/// Trait for the display
pub trait Renderer {
    /// Draw the whole active screen
    fn redraw_active_screen(&mut self, view: &ScreenView<'_>);

    /// Refresh only the elapsed-time column of the spot list
    fn redraw_elapsed_column(&mut self, view: &ScreenView<'_>);
}

/// Trait for the new-spot notification speaker
pub trait Audio {
    /// Play one short tone. Must not block the loop for longer than the tone.
    fn play_tone(&mut self, tone: &AudioConfig);
}

pub trait PowerControl {
    /// Power down. `wake_after` of `None` means wake on touch only.
    fn enter_deep_sleep(&mut self, wake_after: Option<Duration>);
}

pub trait UpdateChecker {
    /// Tag of a newer release, if there is one
    fn check_for_update(&mut self) -> Option<String>;
}

pub trait TouchInput {
    /// True if the panel was touched since the last poll
    fn poll_touch(&mut self) -> bool;
}

/// Status line shown in place of the spot list when the feed is not up
pub fn feed_status_text(status: FeedStatus) -> Option<&'static str> {
    match status {
        FeedStatus::Connected => None,
        FeedStatus::Connecting => Some("Connecting..."),
        FeedStatus::Unavailable => Some("HamAlert Unavailable"),
        FeedStatus::LoginFailed => Some("HamAlert Login Failed"),
    }
}
