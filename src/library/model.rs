use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name given to a library that has never been saved.
pub const DEFAULT_LIBRARY_NAME: &str = "new_library";

/// A reference to an audio file: a display name plus where it lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub location: PathBuf,
}

impl Track {
    /// Build a track from a file path, naming it after the file stem.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            name,
            location: path.to_path_buf(),
        }
    }
}

/// A named group of background-music tracks ("Battle", "Tavern", ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }
}

/// A one-shot sound pinned to a sampler slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    pub slot: usize,
    pub name: String,
    pub location: PathBuf,
}

/// The whole saved state of a session: themes plus sampler assignments.
///
/// Themes are looked up by name with a plain linear scan; names are kept
/// unique by rejecting duplicates where they would be written (`add_theme`,
/// `rename_theme`), so a first-match scan is unambiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub effects: Vec<EffectSlot>,
    /// Where this library was last loaded from or saved to.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// A fresh, empty library with the default name.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_LIBRARY_NAME.to_string(),
            themes: Vec::new(),
            effects: Vec::new(),
            path: None,
        }
    }

    /// Look a theme up by name (first match).
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn theme_mut(&mut self, name: &str) -> Option<&mut Theme> {
        self.themes.iter_mut().find(|t| t.name == name)
    }

    /// Append a new empty theme. Rejects blank names and names already in use.
    pub fn add_theme(&mut self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("theme name is empty".to_string());
        }
        if self.theme(name).is_some() {
            return Err(format!("a theme named '{name}' already exists"));
        }
        self.themes.push(Theme::new(name));
        Ok(())
    }

    /// Rename a theme, keeping its track list. Exactly one entry changes.
    pub fn rename_theme(&mut self, old: &str, new: &str) -> Result<(), String> {
        let new = new.trim();
        if new.is_empty() {
            return Err("theme name is empty".to_string());
        }
        if new != old && self.theme(new).is_some() {
            return Err(format!("a theme named '{new}' already exists"));
        }
        match self.theme_mut(old) {
            Some(theme) => {
                theme.name = new.to_string();
                Ok(())
            }
            None => Err(format!("no theme named '{old}'")),
        }
    }

    /// Remove a theme and its tracks. Returns false when no such theme exists.
    pub fn remove_theme(&mut self, name: &str) -> bool {
        match self.themes.iter().position(|t| t.name == name) {
            Some(i) => {
                self.themes.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn effect_at(&self, slot: usize) -> Option<&EffectSlot> {
        self.effects.iter().find(|e| e.slot == slot)
    }

    /// Assign an effect to a slot, replacing whatever was there.
    pub fn set_effect(&mut self, slot: usize, name: impl Into<String>, location: PathBuf) {
        self.clear_effect(slot);
        self.effects.push(EffectSlot {
            slot,
            name: name.into(),
            location,
        });
    }

    /// Empty a slot. Returns false when the slot was already empty.
    pub fn clear_effect(&mut self, slot: usize) -> bool {
        match self.effects.iter().position(|e| e.slot == slot) {
            Some(i) => {
                self.effects.remove(i);
                true
            }
            None => false,
        }
    }

    /// Drop effect assignments that no longer fit the sampler grid.
    /// The grid may have shrunk via config since the library was written.
    pub fn retain_effects_within(&mut self, slots: usize) {
        self.effects.retain(|e| e.slot < slots);
    }
}
