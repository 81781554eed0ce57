use crate::config::Config;
use crate::models::{PropagationSnapshot, Screen};
use crate::services::device::{
    Audio, BellAudio, ConsoleRenderer, NoOpPowerControl, NoOpUpdateChecker, NoTouchInput,
    PowerControl, Renderer, ScreenView, TouchInput, UpdateChecker,
};
use crate::services::scheduler::{time_until_hour, TICK_INTERVAL};
use crate::services::{
    Action, FeedStatus, FetchError, LineDecoder, PowerMode, PropagationClient, Scheduler,
    SessionManager, SleepReason, SpotParser, SpotStore, TelnetSession,
};
use chrono::{Local, NaiveTime, Timelike, Utc};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::time::{interval, MissedTickBehavior};

type PendingFetch = oneshot::Receiver<Result<PropagationSnapshot, FetchError>>;

/// Wall-clock readings taken once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    /// Local time, for the sleep schedule and the wake delay
    pub local_time: NaiveTime,
    /// UTC seconds since midnight, for spot ages
    pub utc_seconds_of_day: u32,
}

impl WallClock {
    pub fn now() -> Self {
        Self {
            local_time: Local::now().time(),
            utc_seconds_of_day: Utc::now().num_seconds_from_midnight(),
        }
    }

    pub fn local_hour(&self) -> u8 {
        self.local_time.hour() as u8
    }
}

/// The board the core runs on
pub struct Devices {
    pub renderer: Box<dyn Renderer>,
    pub audio: Box<dyn Audio>,
    pub power: Box<dyn PowerControl>,
    pub updates: Box<dyn UpdateChecker>,
    pub touch: Box<dyn TouchInput>,
}

impl Devices {
    /// Text output on stdout, no touch panel, no power management
    pub fn console() -> Self {
        Self {
            renderer: Box::new(ConsoleRenderer::new(std::io::stdout())),
            audio: Box::new(BellAudio::new(std::io::stdout())),
            power: Box::new(NoOpPowerControl::new()),
            updates: Box::new(NoOpUpdateChecker),
            touch: Box::new(NoTouchInput),
        }
    }
}

/// Main application state
pub struct App {
    config: Config,
    settings_path: Option<PathBuf>,
    spot_parser: SpotParser,
    line_decoder: LineDecoder,
    spot_store: SpotStore,
    propagation: PropagationSnapshot,
    scheduler: Scheduler,
    session_manager: SessionManager,
    telnet: Option<TelnetSession>,
    propagation_client: Option<PropagationClient>,
    /// Fetch running on the runtime; checked once per tick
    pending_propagation: Option<PendingFetch>,
    new_version: Option<String>,
    devices: Devices,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, devices: Devices, now: Instant) -> Self {
        let propagation_client = match PropagationClient::new(config.propagation_url.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Propagation feed disabled: {}", e);
                None
            }
        };
        let scheduler = Scheduler::new(now, config.power, config.check_for_updates);

        Self {
            config,
            settings_path: None,
            spot_parser: SpotParser::new(),
            line_decoder: LineDecoder::new(),
            spot_store: SpotStore::new(),
            propagation: PropagationSnapshot::default(),
            scheduler,
            session_manager: SessionManager::new(),
            telnet: None,
            propagation_client,
            pending_propagation: None,
            new_version: None,
            devices,
        }
    }

    /// Write settings changes to `path`
    pub fn persist_to(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spot_store(&self) -> &SpotStore {
        &self.spot_store
    }

    pub fn propagation(&self) -> &PropagationSnapshot {
        &self.propagation
    }

    pub fn propagation_pending(&self) -> bool {
        self.pending_propagation.is_some()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn new_version(&self) -> Option<&str> {
        self.new_version.as_deref()
    }

    /// Switch screens (menu navigation lives outside the core)
    pub fn show_screen(&mut self, screen: Screen) {
        self.scheduler.set_active_screen(screen);
    }

    /// Replace the settings, e.g. after the web form was submitted
    pub fn apply_config(&mut self, config: Config) {
        if let Some(path) = &self.settings_path {
            match config.save_to(path) {
                Ok(()) => tracing::info!("Settings saved to {}", path.display()),
                Err(e) => tracing::error!("Failed to save settings: {}", e),
            }
        }
        self.scheduler.set_power_config(config.power);
        self.config = config;
        self.scheduler.invalidate();
    }

    /// Factory reset from the settings screen; feed credentials survive
    pub fn reset_settings(&mut self) {
        let mut config = self.config.clone();
        config.reset_to_defaults();
        self.apply_config(config);
    }

    /// Feed raw telnet bytes through the decoder and parser. Returns the
    /// number of spots added.
    pub fn ingest(&mut self, bytes: &[u8]) -> usize {
        let parser = &self.spot_parser;
        let store = &mut self.spot_store;
        let audio = &mut self.devices.audio;
        let tone = &self.config.audio;

        let added = self.line_decoder.feed(bytes, |line| match parser.parse(line) {
            Some(spot) => {
                tracing::debug!("Spot: {} {} {}", spot.callsign, spot.frequency, spot.mode);
                store.add_spot(spot);
                audio.play_tone(tone);
                true
            }
            None => {
                tracing::trace!("Ignored line: {}", line);
                false
            }
        });

        self.scheduler.spots_ingested(added);
        added
    }

    pub fn handle_touch(&mut self, now: Instant) {
        self.scheduler.on_touch(now);
    }

    /// Work due once at boot
    pub async fn startup(&mut self, now: Instant, clock: WallClock) {
        tracing::info!("Starting up");
        for action in self.scheduler.startup_actions() {
            self.execute(action, now, clock).await;
        }
    }

    /// One pass of the main loop. Returns false once the device is asleep.
    pub async fn run_tick(&mut self, now: Instant, clock: WallClock) -> bool {
        if self.devices.touch.poll_touch() {
            self.handle_touch(now);
        }
        self.collect_propagation();

        for action in self.scheduler.tick(now, clock.local_hour()) {
            self.execute(action, now, clock).await;
        }
        if let Some(action) = self.scheduler.end_tick(now) {
            self.execute(action, now, clock).await;
        }

        self.scheduler.mode() != PowerMode::Asleep
    }

    /// Main loop: startup work, then a fixed tick until deep sleep
    pub async fn run(mut self) {
        self.startup(Instant::now(), WallClock::now()).await;

        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if !self.run_tick(Instant::now(), WallClock::now()).await {
                break;
            }
        }

        tracing::info!("Main loop stopped");
    }

    pub async fn execute(&mut self, action: Action, now: Instant, clock: WallClock) {
        match action {
            Action::PollFeed => self.poll_feed(),
            Action::Reconnect => self.reconnect().await,
            Action::RefreshPropagation => self.refresh_propagation(),
            Action::CheckForUpdate => self.check_for_update(),
            Action::RedrawActiveScreen => {
                let view = screen_view(
                    &self.scheduler,
                    &self.spot_store,
                    &self.propagation,
                    self.new_version.as_deref(),
                    now,
                    clock,
                );
                self.devices.renderer.redraw_active_screen(&view);
            }
            Action::RedrawElapsedColumn => {
                let view = screen_view(
                    &self.scheduler,
                    &self.spot_store,
                    &self.propagation,
                    self.new_version.as_deref(),
                    now,
                    clock,
                );
                self.devices.renderer.redraw_elapsed_column(&view);
            }
            Action::DeepSleep(reason) => self.enter_deep_sleep(reason, clock),
        }
    }

    fn poll_feed(&mut self) {
        let Some(session) = self.telnet.as_mut() else {
            return;
        };
        let drained = session.drain();
        self.ingest(&drained.bytes);

        if !drained.open {
            tracing::info!(
                truncated_lines = self.line_decoder.truncated_lines(),
                "Spot feed closed"
            );
            self.telnet = None;
            self.session_manager.disconnected();
            self.scheduler.feed_dropped();
        }
    }

    async fn reconnect(&mut self) {
        // Fresh session: the server replays the last spots on login
        self.telnet = None;
        self.spot_store.clear();
        self.line_decoder.reset();
        self.scheduler.invalidate();

        match self.session_manager.attempt_session(&self.config.telnet).await {
            Ok(session) => {
                self.telnet = Some(session);
                self.scheduler.record_session(FeedStatus::Connected);
                self.poll_feed();
            }
            Err(e) => {
                tracing::warn!("Spot feed unavailable: {}", e);
                self.scheduler.record_session(FeedStatus::from(&e));
            }
        }
    }

    /// Start a fetch on the runtime; the result is picked up by a later tick
    fn refresh_propagation(&mut self) {
        if self.pending_propagation.is_some() {
            tracing::debug!("Propagation refresh already in flight");
            return;
        }
        let Some(client) = self.propagation_client.clone() else {
            self.scheduler.propagation_result(false);
            return;
        };

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(client.fetch().await);
        });
        self.pending_propagation = Some(rx);
    }

    fn collect_propagation(&mut self) {
        let Some(mut pending) = self.pending_propagation.take() else {
            return;
        };

        match pending.try_recv() {
            Ok(Ok(snapshot)) => {
                self.propagation = snapshot;
                self.scheduler.propagation_result(true);
            }
            Ok(Err(e)) => {
                tracing::warn!("Propagation refresh failed: {}", e);
                self.scheduler.propagation_result(false);
            }
            Err(TryRecvError::Empty) => self.pending_propagation = Some(pending),
            Err(TryRecvError::Closed) => {
                tracing::warn!("Propagation refresh ended without a result");
                self.scheduler.propagation_result(false);
            }
        }
    }

    fn check_for_update(&mut self) {
        if let Some(tag) = self.devices.updates.check_for_update() {
            tracing::info!("New version available: {}", tag);
            self.new_version = Some(tag);
            self.scheduler.invalidate();
        }
    }

    fn enter_deep_sleep(&mut self, reason: SleepReason, clock: WallClock) {
        let wake_after = match reason {
            SleepReason::Schedule => Some(time_until_hour(
                clock.local_time,
                self.config.power.wake_hour,
            )),
            SleepReason::Inactivity => None,
        };

        self.telnet = None;
        self.pending_propagation = None;
        self.session_manager.disconnected();
        self.devices.power.enter_deep_sleep(wake_after);
    }
}

fn screen_view<'a>(
    scheduler: &Scheduler,
    spots: &'a SpotStore,
    propagation: &'a PropagationSnapshot,
    new_version: Option<&'a str>,
    now: Instant,
    clock: WallClock,
) -> ScreenView<'a> {
    ScreenView {
        screen: scheduler.active_screen(),
        spots,
        propagation,
        propagation_available: scheduler.propagation_available(),
        feed_status: scheduler.feed_status(),
        utc_seconds_of_day: clock.utc_seconds_of_day,
        grace_remaining: scheduler.grace_remaining(now),
        new_version,
    }
}
