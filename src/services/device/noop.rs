//! Stand-ins for hardware the host does not have

use super::{PowerControl, TouchInput, UpdateChecker};
use std::time::Duration;

/// Logs the sleep request instead of powering down
pub struct NoOpPowerControl;

impl NoOpPowerControl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpPowerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerControl for NoOpPowerControl {
    fn enter_deep_sleep(&mut self, wake_after: Option<Duration>) {
        match wake_after {
            Some(delay) => tracing::info!("Deep sleep requested, wake in {}s", delay.as_secs()),
            None => tracing::info!("Deep sleep requested, wake on touch"),
        }
    }
}

/// Never reports a new release
#[derive(Default)]
pub struct NoOpUpdateChecker;

impl UpdateChecker for NoOpUpdateChecker {
    fn check_for_update(&mut self) -> Option<String> {
        None
    }
}

/// A panel that is never touched
#[derive(Default)]
pub struct NoTouchInput;

impl TouchInput for NoTouchInput {
    fn poll_touch(&mut self) -> bool {
        false
    }
}
