use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::Mutex;

// Env-var tests share process state, so they serialize on one lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    saved: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn apply(key: &'static str, val: Option<&str>) -> Self {
        let saved = std::env::var_os(key);
        unsafe {
            match val {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { key, saved }
    }

    fn set(key: &'static str, val: &str) -> Self {
        Self::apply(key, Some(val))
    }

    fn unset(key: &'static str) -> Self {
        Self::apply(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match self.saved.take() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

#[test]
fn resolve_config_path_prefers_wyrmsong_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("WYRMSONG_CONFIG_PATH", "/tmp/wyrmsong-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/wyrmsong-test-config.toml")
    );
}

#[test]
fn xdg_config_home_wins_over_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-conf");
    let _g2 = EnvGuard::set("HOME", "/tmp/ignored-home");

    let expected = std::path::Path::new("/tmp/xdg-conf")
        .join("wyrmsong")
        .join("config.toml");
    assert_eq!(default_config_path().unwrap(), expected);
}

#[test]
fn home_dot_config_is_the_fallback() {
    let _lock = env_lock();
    let _g1 = EnvGuard::unset("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/somewhere");

    let expected = std::path::Path::new("/tmp/somewhere")
        .join(".config")
        .join("wyrmsong")
        .join("config.toml");
    assert_eq!(default_config_path().unwrap(), expected);
}

#[test]
fn config_file_populates_every_section() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 800
tick_ms = 250

[ui]
header_text = " dice and drums "

[library]
extensions = ["ogg", "flac"]
recursive = false
follow_links = false
default_path = "/tmp/campaign.json"

[sampler]
rows = 2
columns = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("WYRMSONG_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::unset("WYRMSONG__SAMPLER__COLUMNS");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 800);
    assert_eq!(s.audio.tick_ms, 250);
    assert_eq!(s.ui.header_text, " dice and drums ");
    assert_eq!(s.library.extensions, vec!["ogg", "flac"]);
    assert!(!s.library.recursive);
    assert!(!s.library.follow_links);
    assert!(s.library.include_hidden);
    assert_eq!(s.library.default_path.as_deref(), Some("/tmp/campaign.json"));
    assert_eq!(s.sampler.rows, 2);
    assert_eq!(s.sampler.columns, 5);
    assert_eq!(s.sampler.slots(), 10);
}

#[test]
fn env_values_beat_the_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[sampler]
columns = 3
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("WYRMSONG_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("WYRMSONG__SAMPLER__COLUMNS", "7");

    let s = Settings::load().unwrap();
    assert_eq!(s.sampler.columns, 7);
    assert_eq!(s.sampler.slots(), 28);
}

#[test]
fn defaults_describe_a_playable_setup() {
    let s = Settings::default();
    assert_eq!(s.audio.quit_fade_out_ms, 500);
    assert_eq!(s.audio.tick_ms, 500);
    assert_eq!(s.sampler.slots(), 16);
    assert!(s.library.recursive);
    assert_eq!(s.library.extensions, vec!["mp3", "flac", "wav", "ogg"]);
    assert!(s.library.default_path.is_none());
}

#[test]
fn validate_rejects_a_zero_sized_grid() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.sampler.rows = 0;
    assert!(s.validate().is_err());

    s.sampler.rows = 4;
    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());
}
