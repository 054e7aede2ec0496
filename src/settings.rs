use std::path::Path;

use crate::config::{ConfigError, ConfigSchema, Configs};
use crate::desktop::monitors::MonitorSelection;

/// File stem of the process-wide settings store.
const SETTINGS_NAME: &str = "Configs";
const ENABLED: &str = "enabled";

/// Process-wide options, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub monitors: MonitorSelection,
    /// F3 may toggle the debug overlay.
    pub f3_debug: bool,
    /// Enumerate windows on a helper thread instead of every frame inline.
    pub window_thread: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            monitors: MonitorSelection::Auto,
            f3_debug: false,
            window_thread: true,
        }
    }
}

impl Settings {
    pub fn schema(dir: &Path) -> ConfigSchema {
        ConfigSchema::new(dir, SETTINGS_NAME)
            .with_string("monitors", "auto")
            .with_string("f3-debug", "disabled")
            .with_string("window-thread", ENABLED)
    }

    /// Load `Configs.txt` from `dir`, writing the defaults when it is absent.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let schema = Self::schema(dir);
        let configs = if schema.path_for(SETTINGS_NAME).exists() {
            Configs::load(&schema, SETTINGS_NAME)?
        } else {
            log::info!("No settings file in {}, writing defaults", dir.display());
            Configs::create(&schema)?
        };
        Ok(Self::from_configs(&configs))
    }

    pub fn from_configs(configs: &Configs) -> Self {
        let defaults = Self::default();

        let monitors = match configs.string("monitors") {
            Some(text) => text.parse().unwrap_or_else(|e| {
                log::warn!("Bad monitors setting, using auto: {e}");
                MonitorSelection::Auto
            }),
            None => defaults.monitors,
        };

        Self {
            monitors,
            f3_debug: configs
                .string("f3-debug")
                .map_or(defaults.f3_debug, |v| v == ENABLED),
            window_thread: configs
                .string("window-thread")
                .map_or(defaults.window_thread, |v| v == ENABLED),
        }
    }
}
