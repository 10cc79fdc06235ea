use serde::Deserialize;

/// Application settings.
///
/// Read from `$XDG_CONFIG_HOME/wyrmsong/config.toml` (or
/// `~/.config/wyrmsong/config.toml`), with `WYRMSONG__`-prefixed
/// environment variables (`__` separates nested keys) taking precedence
/// over the file, and the file over the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
    pub sampler: SamplerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Milliseconds of music fade-out on quit. Zero cuts it instantly.
    /// Effects are never faded; they stop outright.
    pub quit_fade_out_ms: u64,
    /// How often the elapsed-time readout advances (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
            tick_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ sounds for the table ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Extensions imported as audio, compared case-insensitively and
    /// without the leading dot.
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when importing a directory.
    pub follow_links: bool,
    /// Import dotfiles too.
    pub include_hidden: bool,
    /// Descend into subdirectories when importing.
    pub recursive: bool,
    /// Hard limit on how deep an import may descend.
    pub max_depth: Option<usize>,
    /// Library file opened at startup when none is given on the command line.
    pub default_path: Option<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "wav", "ogg"].map(String::from).into(),
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            default_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Rows in the effect grid.
    pub rows: usize,
    /// Columns in the effect grid.
    pub columns: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self { rows: 4, columns: 4 }
    }
}

impl SamplerSettings {
    /// Total number of effect slots in the grid.
    pub fn slots(&self) -> usize {
        self.rows * self.columns
    }
}
