//! Cooperative scheduler and power state machine
//!
//! The scheduler owns every timer and the power mode but performs no I/O.
//! Each [`Scheduler::tick`] returns the work due now as a list of
//! [`Action`]s; the application executes them and reports the outcome back
//! through `record_session`, `feed_dropped`, `spots_ingested` and
//! `propagation_result`.

use super::session::FeedStatus;
use crate::config::PowerConfig;
use crate::models::Screen;
use chrono::{NaiveTime, Timelike};
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const PERIODIC_CHECK_INTERVAL: Duration = Duration::from_secs(5);
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const SPOT_LIST_UPDATE_INTERVAL: Duration = Duration::from_secs(30);
pub const PROPAGATION_UPDATE_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const SLEEP_GRACE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Active,
    /// Counting down to deep sleep; a touch cancels
    GracePeriod,
    Asleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepReason {
    Inactivity,
    Schedule,
}

/// Work requested by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Drain whatever the telnet socket has buffered
    PollFeed,
    /// Drop the current session and log in again
    Reconnect,
    RefreshPropagation,
    CheckForUpdate,
    RedrawActiveScreen,
    /// Refresh only the "minutes ago" column of the spot list
    RedrawElapsedColumn,
    DeepSleep(SleepReason),
}

pub struct Scheduler {
    power: PowerConfig,
    check_for_updates: bool,
    mode: PowerMode,
    sleep_reason: Option<SleepReason>,
    feed_status: FeedStatus,
    propagation_available: bool,
    active_screen: Screen,
    screen_before_grace: Screen,
    /// Set when a touch cancels a scheduled sleep; cleared once the local
    /// hour leaves the sleep window
    schedule_suppressed: bool,
    last_reconnect: Instant,
    last_spot_refresh: Instant,
    last_propagation_refresh: Instant,
    last_periodic_check: Instant,
    last_update_check: Instant,
    last_interaction: Instant,
    grace_started: Option<Instant>,
    dirty: bool,
}

impl Scheduler {
    pub fn new(now: Instant, power: PowerConfig, check_for_updates: bool) -> Self {
        Self {
            power,
            check_for_updates,
            mode: PowerMode::Active,
            sleep_reason: None,
            feed_status: FeedStatus::Connecting,
            propagation_available: false,
            active_screen: Screen::default(),
            screen_before_grace: Screen::default(),
            schedule_suppressed: false,
            last_reconnect: now,
            last_spot_refresh: now,
            last_propagation_refresh: now,
            last_periodic_check: now,
            last_update_check: now,
            last_interaction: now,
            grace_started: None,
            dirty: true,
        }
    }

    /// Work to do once at boot, before the first tick
    pub fn startup_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::Reconnect, Action::RefreshPropagation];
        if self.check_for_updates {
            actions.push(Action::CheckForUpdate);
        }
        actions
    }

    /// Evaluate power state and timers. `local_hour` is the wall-clock hour
    /// used by the sleep schedule.
    pub fn tick(&mut self, now: Instant, local_hour: u8) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.mode == PowerMode::Asleep {
            return actions;
        }

        let in_window = self.power.scheduled_sleep_enabled
            && in_sleep_window(local_hour, self.power.sleep_hour, self.power.wake_hour);
        if !in_window && self.schedule_suppressed {
            tracing::debug!("Left sleep window, schedule re-armed");
            self.schedule_suppressed = false;
        }

        match self.mode {
            PowerMode::Active => {
                let scheduled = in_window && !self.schedule_suppressed;
                if scheduled {
                    self.enter_grace_period(now, SleepReason::Schedule);
                } else if self.inactivity_expired(now) {
                    self.enter_grace_period(now, SleepReason::Inactivity);
                }
            }
            PowerMode::GracePeriod => {
                let expired = self
                    .grace_started
                    .is_some_and(|started| now.duration_since(started) >= SLEEP_GRACE_PERIOD);
                if expired && self.sleep_reason == Some(SleepReason::Schedule) && !in_window {
                    // the window closed during the countdown
                    tracing::info!("Sleep window ended during grace period, staying awake");
                    self.leave_grace_period();
                } else if expired {
                    let reason = self.sleep_reason.unwrap_or(SleepReason::Inactivity);
                    tracing::info!("Grace period over, entering deep sleep ({:?})", reason);
                    self.mode = PowerMode::Asleep;
                    self.grace_started = None;
                    actions.push(Action::DeepSleep(reason));
                    return actions;
                }
            }
            PowerMode::Asleep => {}
        }

        if now.duration_since(self.last_periodic_check) >= PERIODIC_CHECK_INTERVAL {
            self.last_periodic_check = now;
            // clock face and grace countdown
            if self.active_screen == Screen::Clock || self.mode == PowerMode::GracePeriod {
                self.dirty = true;
            }
            if self.feed_status == FeedStatus::Connected {
                actions.push(Action::PollFeed);
            } else if now.duration_since(self.last_reconnect) >= RECONNECT_INTERVAL {
                self.last_reconnect = now;
                self.feed_status = FeedStatus::Connecting;
                self.dirty = true;
                actions.push(Action::Reconnect);
            }
        }

        if now.duration_since(self.last_propagation_refresh) >= PROPAGATION_UPDATE_INTERVAL {
            self.last_propagation_refresh = now;
            actions.push(Action::RefreshPropagation);
        }

        if self.check_for_updates
            && now.duration_since(self.last_update_check) >= UPDATE_CHECK_INTERVAL
        {
            self.last_update_check = now;
            actions.push(Action::CheckForUpdate);
        }

        actions
    }

    /// Redraw decision after the tick's actions have run. Returns at most one
    /// redraw.
    pub fn end_tick(&mut self, now: Instant) -> Option<Action> {
        if self.mode == PowerMode::Asleep {
            return None;
        }

        if std::mem::take(&mut self.dirty) {
            self.last_spot_refresh = now;
            return Some(Action::RedrawActiveScreen);
        }

        if self.active_screen.shows_spots()
            && now.duration_since(self.last_spot_refresh) >= SPOT_LIST_UPDATE_INTERVAL
        {
            self.last_spot_refresh = now;
            return Some(Action::RedrawElapsedColumn);
        }

        None
    }

    /// Any touch on the panel
    pub fn on_touch(&mut self, now: Instant) {
        self.last_interaction = now;
        if self.mode != PowerMode::GracePeriod {
            return;
        }

        if self.sleep_reason == Some(SleepReason::Schedule) {
            self.schedule_suppressed = true;
        }
        tracing::info!("Sleep cancelled by touch");
        self.leave_grace_period();
    }

    /// Outcome of a `Reconnect` action
    pub fn record_session(&mut self, status: FeedStatus) {
        if self.feed_status != status {
            self.feed_status = status;
            self.dirty = true;
        }
    }

    /// The feed socket closed while polling
    pub fn feed_dropped(&mut self) {
        self.record_session(FeedStatus::Unavailable);
    }

    /// Number of spots appended during a poll
    pub fn spots_ingested(&mut self, count: usize) {
        if count > 0 {
            self.dirty = true;
        }
    }

    /// Outcome of a `RefreshPropagation` action
    pub fn propagation_result(&mut self, ok: bool) {
        self.propagation_available = ok;
        if self.active_screen.shows_propagation() {
            self.dirty = true;
        }
    }

    /// Request a full redraw on the next `end_tick`
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn set_active_screen(&mut self, screen: Screen) {
        if self.mode == PowerMode::GracePeriod {
            self.screen_before_grace = screen;
            return;
        }
        if self.active_screen != screen {
            self.active_screen = screen;
            self.dirty = true;
        }
    }

    /// Apply edited power settings
    pub fn set_power_config(&mut self, power: PowerConfig) {
        self.power = power;
    }

    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    pub fn sleep_reason(&self) -> Option<SleepReason> {
        self.sleep_reason
    }

    pub fn feed_status(&self) -> FeedStatus {
        self.feed_status
    }

    pub fn propagation_available(&self) -> bool {
        self.propagation_available
    }

    pub fn active_screen(&self) -> Screen {
        self.active_screen
    }

    pub fn power(&self) -> &PowerConfig {
        &self.power
    }

    /// Time left before deep sleep, while in the grace period
    pub fn grace_remaining(&self, now: Instant) -> Option<Duration> {
        self.grace_started
            .map(|started| SLEEP_GRACE_PERIOD.saturating_sub(now.duration_since(started)))
    }

    fn inactivity_expired(&self, now: Instant) -> bool {
        let minutes = self.power.sleep_timeout_minutes;
        minutes > 0
            && now.duration_since(self.last_interaction)
                >= Duration::from_secs(u64::from(minutes) * 60)
    }

    fn enter_grace_period(&mut self, now: Instant, reason: SleepReason) {
        tracing::info!("Entering sleep grace period ({:?})", reason);
        self.mode = PowerMode::GracePeriod;
        self.sleep_reason = Some(reason);
        self.grace_started = Some(now);
        self.screen_before_grace = self.active_screen;
        self.active_screen = Screen::SleepGracePeriod;
        self.dirty = true;
    }

    fn leave_grace_period(&mut self) {
        self.mode = PowerMode::Active;
        self.sleep_reason = None;
        self.grace_started = None;
        self.active_screen = self.screen_before_grace;
        self.dirty = true;
    }
}

/// Whether `hour` falls in [sleep_hour, wake_hour), wrapping past midnight
/// when sleep_hour > wake_hour. Equal hours give an empty window.
pub fn in_sleep_window(hour: u8, sleep_hour: u8, wake_hour: u8) -> bool {
    if sleep_hour > wake_hour {
        hour >= sleep_hour || hour < wake_hour
    } else {
        hour >= sleep_hour && hour < wake_hour
    }
}

/// Delay from `now` until the next time the clock reads `hour`:00
pub fn time_until_hour(now: NaiveTime, hour: u8) -> Duration {
    const DAY: u64 = 24 * 60 * 60;
    let now_secs = u64::from(now.num_seconds_from_midnight());
    let target = u64::from(hour % 24) * 3600;
    let secs = if target > now_secs {
        target - now_secs
    } else {
        target + DAY - now_secs
    };
    Duration::from_secs(secs)
}
