use std::{env, path::PathBuf};

use super::schema::Settings;

/// Loading and validation for [`Settings`].
///
/// Sources are layered: struct defaults, then an optional config file,
/// then `WYRMSONG__`-prefixed environment variables on top.
impl Settings {
    /// Build settings from the config file (if any) plus environment overrides.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("WYRMSONG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Sanity-check values that would break the UI or the audio thread.
    pub fn validate(&self) -> Result<(), String> {
        if self.sampler.rows == 0 || self.sampler.columns == 0 {
            return Err("sampler.rows and sampler.columns must be >= 1".to_string());
        }
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `WYRMSONG_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os("WYRMSONG_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// Compute the default config path under `$XDG_CONFIG_HOME/wyrmsong/config.toml`
/// or `~/.config/wyrmsong/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;

    Some(config_home.join("wyrmsong").join("config.toml"))
}
