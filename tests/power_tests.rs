//! Sleep settings from the config file driving the power state machine

use dx_companion::config::Config;
use dx_companion::services::scheduler::{SLEEP_GRACE_PERIOD, TICK_INTERVAL};
use dx_companion::services::{Action, PowerMode, Scheduler, SleepReason};
use std::time::{Duration, Instant};

fn scheduler_from(ini: &str, start: Instant) -> Scheduler {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ini");
    std::fs::write(&path, ini).unwrap();
    let config = Config::load_from(&path);
    Scheduler::new(start, config.power, config.check_for_updates)
}

/// Tick every 100 ms from `from` for `span`, collecting deep-sleep requests
fn run(scheduler: &mut Scheduler, from: Instant, span: Duration, hour: u8) -> Vec<Action> {
    let mut sleeps = Vec::new();
    let mut now = from;
    while now <= from + span {
        for action in scheduler.tick(now, hour) {
            if matches!(action, Action::DeepSleep(_)) {
                sleeps.push(action);
            }
        }
        scheduler.end_tick(now);
        now += TICK_INTERVAL;
    }
    sleeps
}

#[test]
fn test_scheduled_sleep_overnight() {
    let start = Instant::now();
    let mut scheduler = scheduler_from(
        "[power]\nscheduled_sleep_enabled = true\nsleep_hour = 22\nwake_hour = 6\n",
        start,
    );

    assert!(run(&mut scheduler, start, Duration::from_secs(120), 21).is_empty());
    assert_eq!(scheduler.mode(), PowerMode::Active);

    let later = start + Duration::from_secs(3600);
    let sleeps = run(&mut scheduler, later, SLEEP_GRACE_PERIOD, 22);
    assert_eq!(sleeps, vec![Action::DeepSleep(SleepReason::Schedule)]);
    assert_eq!(scheduler.mode(), PowerMode::Asleep);
}

#[test]
fn test_touch_cancels_and_device_stays_awake() {
    let start = Instant::now();
    let mut scheduler = scheduler_from("[power]\nsleep_timeout_minutes = 10\n", start);

    let timeout = start + Duration::from_secs(10 * 60);
    scheduler.tick(timeout, 12);
    assert_eq!(scheduler.mode(), PowerMode::GracePeriod);

    scheduler.on_touch(timeout + Duration::from_secs(59));
    let sleeps = run(&mut scheduler, timeout + Duration::from_secs(59), Duration::from_secs(120), 12);
    assert!(sleeps.is_empty());
    assert_eq!(scheduler.mode(), PowerMode::Active);
}

#[test]
fn test_disabled_power_settings_never_sleep() {
    let start = Instant::now();
    let mut scheduler = scheduler_from("[power]\nsleep_timeout_minutes = 0\n", start);

    let far = start + Duration::from_secs(48 * 3600);
    assert!(scheduler
        .tick(far, 3)
        .iter()
        .all(|a| !matches!(a, Action::DeepSleep(_))));
    assert_eq!(scheduler.mode(), PowerMode::Active);
}
