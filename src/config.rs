use crate::services::DEFAULT_PROPAGATION_URL;
use configparser::ini::Ini;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_TELNET_HOST: &str = "hamalert.org";
const DEFAULT_TELNET_PORT: u16 = 7300;
const DEFAULT_TELNET_USERNAME: &str = "N0CALL";

/// Highest audio volume step; 0 mutes the new-spot tone
pub const MAX_VOLUME_STEP: u8 = 4;
/// Longest inactivity timeout offered, in minutes
pub const MAX_SLEEP_TIMEOUT_MINUTES: u32 = 720;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to create config directory: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),
}

/// Application settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub telnet: TelnetConfig,
    pub propagation_url: String,
    pub audio: AudioConfig,
    pub power: PowerConfig,
    pub check_for_updates: bool,
}

/// Spot feed endpoint and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelnetConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// New-spot notification tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// 0 (muted) to `MAX_VOLUME_STEP`
    pub volume_step: u8,
    pub tone_frequency_hz: u32,
    pub tone_duration_ms: u32,
}

/// Inactivity and scheduled sleep settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerConfig {
    /// 0 disables the inactivity timeout
    pub sleep_timeout_minutes: u32,
    pub scheduled_sleep_enabled: bool,
    /// Local hour the sleep window opens
    pub sleep_hour: u8,
    /// Local hour the sleep window closes
    pub wake_hour: u8,
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TELNET_HOST.to_string(),
            port: DEFAULT_TELNET_PORT,
            username: DEFAULT_TELNET_USERNAME.to_string(),
            password: String::new(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume_step: 1,
            tone_frequency_hz: 500,
            tone_duration_ms: 50,
        }
    }
}

impl AudioConfig {
    pub fn is_muted(&self) -> bool {
        self.volume_step == 0
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            sleep_timeout_minutes: 0,
            scheduled_sleep_enabled: false,
            sleep_hour: 23,
            wake_hour: 7,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telnet: TelnetConfig::default(),
            propagation_url: DEFAULT_PROPAGATION_URL.to_string(),
            audio: AudioConfig::default(),
            power: PowerConfig::default(),
            check_for_updates: true,
        }
    }
}

fn get_int(ini: &Ini, section: &str, key: &str) -> Option<i64> {
    ini.getint(section, key).ok().flatten()
}

fn get_bool(ini: &Ini, section: &str, key: &str) -> Option<bool> {
    ini.getbool(section, key).ok().flatten()
}

fn hour(value: Option<i64>, default: u8) -> u8 {
    value.map_or(default, |h| h.clamp(0, 23) as u8)
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dx-companion", "dx-companion")
            .map(|dirs| dirs.config_dir().join("settings.ini"))
    }

    /// Load config from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path; missing keys keep their defaults and
    /// out-of-range numbers are clamped
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let mut ini = Ini::new();
        if let Err(e) = ini.load(path) {
            tracing::warn!("Failed to read {}: {}, using defaults", path.display(), e);
            return Self::default();
        }

        let defaults = Self::default();

        let telnet = TelnetConfig {
            host: ini
                .get("telnet", "host")
                .unwrap_or(defaults.telnet.host),
            port: get_int(&ini, "telnet", "port")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(defaults.telnet.port),
            username: ini
                .get("telnet", "username")
                .unwrap_or(defaults.telnet.username),
            password: ini.get("telnet", "password").unwrap_or_default(),
        };

        let audio = AudioConfig {
            volume_step: get_int(&ini, "audio", "volume_step")
                .map_or(defaults.audio.volume_step, |v| {
                    v.clamp(0, i64::from(MAX_VOLUME_STEP)) as u8
                }),
            tone_frequency_hz: get_int(&ini, "audio", "tone_frequency")
                .map_or(defaults.audio.tone_frequency_hz, |v| v.clamp(300, 1400) as u32),
            tone_duration_ms: get_int(&ini, "audio", "tone_duration_ms")
                .map_or(defaults.audio.tone_duration_ms, |v| v.clamp(25, 500) as u32),
        };

        let power = PowerConfig {
            sleep_timeout_minutes: get_int(&ini, "power", "sleep_timeout_minutes")
                .map_or(defaults.power.sleep_timeout_minutes, |v| {
                    v.clamp(0, i64::from(MAX_SLEEP_TIMEOUT_MINUTES)) as u32
                }),
            scheduled_sleep_enabled: get_bool(&ini, "power", "scheduled_sleep_enabled")
                .unwrap_or(defaults.power.scheduled_sleep_enabled),
            sleep_hour: hour(get_int(&ini, "power", "sleep_hour"), defaults.power.sleep_hour),
            wake_hour: hour(get_int(&ini, "power", "wake_hour"), defaults.power.wake_hour),
        };

        Self {
            telnet,
            propagation_url: ini
                .get("propagation", "url")
                .unwrap_or(defaults.propagation_url),
            audio,
            power,
            check_for_updates: get_bool(&ini, "system", "check_for_updates")
                .unwrap_or(defaults.check_for_updates),
        }
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDir)?;
        }

        let mut ini = Ini::new();
        ini.set("telnet", "host", Some(self.telnet.host.clone()));
        ini.set("telnet", "port", Some(self.telnet.port.to_string()));
        ini.set("telnet", "username", Some(self.telnet.username.clone()));
        ini.set("telnet", "password", Some(self.telnet.password.clone()));
        ini.set("propagation", "url", Some(self.propagation_url.clone()));
        ini.set(
            "audio",
            "volume_step",
            Some(self.audio.volume_step.to_string()),
        );
        ini.set(
            "audio",
            "tone_frequency",
            Some(self.audio.tone_frequency_hz.to_string()),
        );
        ini.set(
            "audio",
            "tone_duration_ms",
            Some(self.audio.tone_duration_ms.to_string()),
        );
        ini.set(
            "power",
            "sleep_timeout_minutes",
            Some(self.power.sleep_timeout_minutes.to_string()),
        );
        ini.set(
            "power",
            "scheduled_sleep_enabled",
            Some(self.power.scheduled_sleep_enabled.to_string()),
        );
        ini.set("power", "sleep_hour", Some(self.power.sleep_hour.to_string()));
        ini.set("power", "wake_hour", Some(self.power.wake_hour.to_string()));
        ini.set(
            "system",
            "check_for_updates",
            Some(self.check_for_updates.to_string()),
        );

        ini.write(path).map_err(ConfigError::Write)
    }

    /// Reset to defaults
    pub fn reset_to_defaults(&mut self) {
        let defaults = Self::default();
        self.propagation_url = defaults.propagation_url;
        self.audio = defaults.audio;
        self.power = defaults.power;
        self.check_for_updates = defaults.check_for_updates;
        // Keep the feed endpoint and credentials as-is
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.ini"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ini");

        let mut config = Config::default();
        config.telnet.username = "SP7ABC".to_string();
        config.telnet.password = "hunter2".to_string();
        config.audio.volume_step = 3;
        config.power.sleep_timeout_minutes = 120;
        config.power.scheduled_sleep_enabled = true;
        config.power.sleep_hour = 22;
        config.power.wake_hour = 6;
        config.check_for_updates = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        std::fs::write(
            &path,
            "[audio]\nvolume_step = 9\ntone_frequency = 20\n\
             [power]\nsleep_timeout_minutes = 5000\nsleep_hour = 31\nwake_hour = -4\n\
             [telnet]\nport = 99999\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.audio.volume_step, MAX_VOLUME_STEP);
        assert_eq!(config.audio.tone_frequency_hz, 300);
        assert_eq!(config.power.sleep_timeout_minutes, MAX_SLEEP_TIMEOUT_MINUTES);
        assert_eq!(config.power.sleep_hour, 23);
        assert_eq!(config.power.wake_hour, 0);
        assert_eq!(config.telnet.port, DEFAULT_TELNET_PORT);
    }

    #[test]
    fn test_reset_keeps_credentials() {
        let mut config = Config::default();
        config.telnet.username = "SP7ABC".to_string();
        config.audio.volume_step = 0;
        config.reset_to_defaults();
        assert_eq!(config.telnet.username, "SP7ABC");
        assert_eq!(config.audio, AudioConfig::default());
    }
}
