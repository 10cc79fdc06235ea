use crate::config;

/// Load settings, substituting defaults when the config is broken.
/// A bad config file should never keep the app from starting.
pub fn load_settings() -> config::Settings {
    let settings = match config::Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("wyrmsong: failed to load config, using defaults: {e}");
            return config::Settings::default();
        }
    };

    if let Err(msg) = settings.validate() {
        eprintln!("wyrmsong: invalid config, using defaults: {msg}");
        return config::Settings::default();
    }

    settings
}
