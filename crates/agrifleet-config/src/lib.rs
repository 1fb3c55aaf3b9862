//! Persisted settings for the AgriFleet dashboard.
//!
//! A single TOML settings record layered through figment (built-in
//! defaults -> settings file -> `AGRIFLEET_*` environment), restored at
//! startup and merge-updated by partial updates -- a partial update
//! replaces only the sections it carries, never the whole record.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use agrifleet_core::session::FleetConfig;

pub mod credentials;

pub use credentials::KeyringTokenStore;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings record ─────────────────────────────────────────────────

/// Backend endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiEndpoints {
    pub backend: String,
    pub field_controller: String,
    pub websocket: String,
    pub mqtt: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            backend: "http://localhost:5000".into(),
            field_controller: "http://192.168.1.100:8000".into(),
            websocket: "ws://localhost:8080/ws".into(),
            mqtt: "mqtt://localhost:1883".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapProvider {
    Openstreetmap,
    Google,
    Mapbox,
}

/// Map display preferences.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapSettings {
    pub provider: MapProvider,
    pub default_zoom: u8,
    pub show_trails: bool,
    /// Hours of trail history to keep visible.
    pub trail_duration: u32,
    /// Seconds between map refreshes.
    pub refresh_rate: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            provider: MapProvider::Openstreetmap,
            default_zoom: 15,
            show_trails: true,
            trail_duration: 24,
            refresh_rate: 5,
        }
    }
}

/// Default operating parameters applied to new missions.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RobotDefaults {
    pub default_altitude: f64,
    pub default_speed: f64,
    pub safety_radius: f64,
    /// Battery percentage that raises a warning.
    pub battery_warning: f64,
    /// Battery percentage considered critically low.
    pub battery_low: f64,
}

impl Default for RobotDefaults {
    fn default() -> Self {
        Self {
            default_altitude: 10.0,
            default_speed: 2.0,
            safety_radius: 50.0,
            battery_warning: 25.0,
            battery_low: 15.0,
        }
    }
}

/// Per-category notification toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationTypes {
    pub battery: bool,
    pub mission: bool,
    pub system: bool,
    pub communication: bool,
}

impl Default for NotificationTypes {
    fn default() -> Self {
        Self {
            battery: true,
            mission: true,
            system: true,
            communication: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sound: bool,
    #[serde(default)]
    pub types: NotificationTypes,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sound: true,
            types: NotificationTypes::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecuritySettings {
    /// Minutes of inactivity before the session ends.
    pub session_timeout: u32,
    pub require_auth: bool,
    pub two_factor_auth: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            session_timeout: 60,
            require_auth: true,
            two_factor_auth: false,
        }
    }
}

/// The persisted settings record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub api_endpoints: ApiEndpoints,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub robots: RobotDefaults,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub security: SecuritySettings,
}

impl Settings {
    /// Merge a partial update: only the sections the update carries are
    /// replaced.
    pub fn merge(&mut self, update: SettingsUpdate) {
        if let Some(api_endpoints) = update.api_endpoints {
            self.api_endpoints = api_endpoints;
        }
        if let Some(map) = update.map {
            self.map = map;
        }
        if let Some(robots) = update.robots {
            self.robots = robots;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(security) = update.security {
            self.security = security;
        }
    }

    /// Translate the backend endpoint into a core `FleetConfig`.
    pub fn fleet_config(&self) -> Result<FleetConfig, ConfigError> {
        let base_url = Url::parse(&self.api_endpoints.backend).map_err(|e| {
            ConfigError::Validation {
                field: "api_endpoints.backend".into(),
                reason: e.to_string(),
            }
        })?;
        Ok(FleetConfig::new(base_url))
    }
}

/// Section-level partial update for [`Settings`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoints: Option<ApiEndpoints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots: Option<RobotDefaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySettings>,
}

// ── Persistence ─────────────────────────────────────────────────────

/// File name of the settings record inside the config directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Loads and persists the settings record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the platform config location
    /// (e.g. `~/.config/agrifleet/settings.toml` on Linux).
    pub fn at_default_location() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("com", "agrifleet", "agrifleet").ok_or_else(|| {
            ConfigError::Validation {
                field: "config dir".into(),
                reason: "no home directory available".into(),
            }
        })?;
        Ok(Self {
            path: dirs.config_dir().join(SETTINGS_FILE),
        })
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore settings: defaults, overlaid by the settings file (if
    /// present), overlaid by `AGRIFLEET_*` environment variables
    /// (sections split on `__`, e.g. `AGRIFLEET_MAP__DEFAULT_ZOOM`).
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(&self.path))
            .merge(Env::prefixed("AGRIFLEET_").split("__"));
        Ok(figment.extract()?)
    }

    /// Persist the full record.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, rendered)?;
        Ok(())
    }

    /// Load, merge a partial update, persist, and return the result.
    pub fn update(&self, update: SettingsUpdate) -> Result<Settings, ConfigError> {
        let mut settings = self.load()?;
        settings.merge(update);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Reset to built-in defaults and persist them.
    pub fn reset(&self) -> Result<Settings, ConfigError> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::at_path(dir.path().join("settings.toml"))
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = store_in(&dir).load().unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.map.default_zoom, 15);
        assert_eq!(settings.api_endpoints.backend, "http://localhost:5000");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut settings = Settings::default();
        settings.map.default_zoom = 18;
        settings.robots.battery_warning = 30.0;
        store.save(&settings).unwrap();

        let restored = store.load().unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn partial_update_replaces_only_named_sections() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut settings = Settings::default();
        settings.security.session_timeout = 120;
        store.save(&settings).unwrap();

        let updated = store
            .update(SettingsUpdate {
                map: Some(MapSettings {
                    default_zoom: 12,
                    ..MapSettings::default()
                }),
                ..SettingsUpdate::default()
            })
            .unwrap();

        // The map section was replaced; security kept its customization.
        assert_eq!(updated.map.default_zoom, 12);
        assert_eq!(updated.security.session_timeout, 120);
    }

    #[test]
    fn reset_restores_defaults_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut settings = Settings::default();
        settings.map.show_trails = false;
        store.save(&settings).unwrap();

        store.reset().unwrap();
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn fleet_config_validates_the_backend_url() {
        let mut settings = Settings::default();
        let config = settings.fleet_config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");

        settings.api_endpoints.backend = "not a url".into();
        assert!(matches!(
            settings.fleet_config(),
            Err(ConfigError::Validation { .. })
        ));
    }
}
