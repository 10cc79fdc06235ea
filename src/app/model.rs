//! Application model types: `App`, the panels and the prompt line.
//!
//! The `App` struct holds the loaded library, the per-panel cursors and
//! the playback flags the UI and runtime read.

use crate::audio::{EffectsHandle, NowPlaying, PlaybackHandle};
use crate::library::{Library, Track};

/// The playback state of the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Which of the three panels owns keyboard input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Panel {
    Themes,
    Playlist,
    Sampler,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Themes => Panel::Playlist,
            Panel::Playlist => Panel::Sampler,
            Panel::Sampler => Panel::Themes,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Panel::Themes => Panel::Sampler,
            Panel::Playlist => Panel::Themes,
            Panel::Sampler => Panel::Playlist,
        }
    }
}

/// What the one-line prompt at the bottom is collecting input for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    NewTheme,
    RenameTheme { theme: String },
    DeleteTheme { theme: String },
    AddTracks,
    AssignEffect { slot: usize },
    SaveLibrary,
    LoadLibrary,
}

impl Prompt {
    /// The label rendered in front of the input line.
    pub fn label(&self) -> String {
        match self {
            Prompt::NewTheme => "new theme name".to_string(),
            Prompt::RenameTheme { theme } => format!("rename '{theme}' to"),
            Prompt::DeleteTheme { theme } => format!("delete '{theme}' and its tracks? y/N"),
            Prompt::AddTracks => "add file or directory".to_string(),
            Prompt::AssignEffect { slot } => format!("effect file for slot {}", slot + 1),
            Prompt::SaveLibrary => "save library to".to_string(),
            Prompt::LoadLibrary => "load library from".to_string(),
        }
    }
}

/// The main application model.
pub struct App {
    pub library: Library,
    /// Name of the theme feeding the playlist, if one is selected.
    pub active_theme: Option<String>,

    pub panel: Panel,
    pub theme_cursor: usize,
    pub track_cursor: usize,
    pub slot_cursor: usize,
    /// Sampler grid capacity (rows x columns).
    pub slots: usize,

    pub playback: PlaybackState,
    pub repeat: bool,
    pub random: bool,
    pub playback_handle: Option<PlaybackHandle>,
    pub effects_handle: Option<EffectsHandle>,

    pub prompt: Option<Prompt>,
    pub input: String,

    pub status: String,
    /// Set when the library differs from what is on disk.
    pub unsaved: bool,
    pub playlist_dirty: bool,
}

impl App {
    /// Create a new `App` around a loaded (or fresh) library.
    pub fn new(library: Library, slots: usize) -> Self {
        Self {
            library,
            active_theme: None,
            panel: Panel::Themes,
            theme_cursor: 0,
            track_cursor: 0,
            slot_cursor: 0,
            slots,
            playback: PlaybackState::Stopped,
            repeat: false,
            random: false,
            playback_handle: None,
            effects_handle: None,
            prompt: None,
            input: String::new(),
            status: "Ready".to_string(),
            unsaved: false,
            playlist_dirty: true,
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Attach the shared set of sounding sampler slots.
    pub fn set_effects_handle(&mut self, h: EffectsHandle) {
        self.effects_handle = Some(h);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    /// Mark the playlist as needing a push to the audio thread.
    pub fn mark_playlist_dirty(&mut self) {
        self.playlist_dirty = true;
    }

    pub fn clear_playlist_dirty(&mut self) {
        self.playlist_dirty = false;
    }

    fn touch(&mut self) {
        self.unsaved = true;
    }

    /// Tracks of the active theme; the audio playlist mirrors this list.
    pub fn active_tracks(&self) -> &[Track] {
        self.active_theme
            .as_deref()
            .and_then(|name| self.library.theme(name))
            .map(|t| t.tracks.as_slice())
            .unwrap_or(&[])
    }

    /// Make the theme at `index` feed the playlist.
    pub fn select_theme(&mut self, index: usize) -> bool {
        match self.library.themes.get(index) {
            Some(theme) => {
                self.active_theme = Some(theme.name.clone());
                self.track_cursor = 0;
                self.mark_playlist_dirty();
                true
            }
            None => false,
        }
    }

    pub fn add_theme(&mut self, name: &str) -> Result<(), String> {
        self.library.add_theme(name)?;
        self.theme_cursor = self.library.themes.len() - 1;
        self.touch();
        Ok(())
    }

    /// Rename a theme; when it is the active one, the selection follows.
    pub fn rename_theme(&mut self, old: &str, new: &str) -> Result<(), String> {
        let new = new.trim();
        self.library.rename_theme(old, new)?;
        if self.active_theme.as_deref() == Some(old) {
            self.active_theme = Some(new.to_string());
        }
        self.touch();
        Ok(())
    }

    /// Delete a theme. Deleting the active one empties the playlist.
    pub fn delete_theme(&mut self, name: &str) -> bool {
        if !self.library.remove_theme(name) {
            return false;
        }
        if self.active_theme.as_deref() == Some(name) {
            self.active_theme = None;
            self.track_cursor = 0;
        }
        self.mark_playlist_dirty();
        self.clamp_cursors();
        self.touch();
        true
    }

    /// Append tracks to the active theme. Requires a selected theme.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> Result<usize, String> {
        let Some(name) = self.active_theme.clone() else {
            return Err("select a theme first".to_string());
        };
        let Some(theme) = self.library.theme_mut(&name) else {
            return Err("select a theme first".to_string());
        };
        let count = tracks.len();
        theme.tracks.extend(tracks);
        if count > 0 {
            self.mark_playlist_dirty();
            self.touch();
        }
        Ok(count)
    }

    /// Remove the track under the cursor from the active theme.
    pub fn remove_selected_track(&mut self) -> Option<Track> {
        let name = self.active_theme.clone()?;
        let cursor = self.track_cursor;
        let theme = self.library.theme_mut(&name)?;
        if cursor >= theme.tracks.len() {
            return None;
        }
        let removed = theme.tracks.remove(cursor);
        self.mark_playlist_dirty();
        self.clamp_cursors();
        self.touch();
        Some(removed)
    }

    pub fn assign_effect(&mut self, slot: usize, track: Track) {
        self.library.set_effect(slot, track.name, track.location);
        self.touch();
    }

    pub fn clear_effect(&mut self, slot: usize) -> bool {
        let cleared = self.library.clear_effect(slot);
        if cleared {
            self.touch();
        }
        cleared
    }

    /// Swap in a library loaded from disk, resetting selection state.
    pub fn replace_library(&mut self, library: Library) {
        self.library = library;
        self.library.retain_effects_within(self.slots);
        self.active_theme = None;
        self.theme_cursor = 0;
        self.track_cursor = 0;
        self.unsaved = false;
        self.mark_playlist_dirty();
    }

    /// Snapshot of the track currently loaded in the audio thread.
    pub fn now_playing(&self) -> Option<NowPlaying> {
        let handle = self.playback_handle.as_ref()?;
        let info = handle.lock().ok()?;
        info.current.clone()
    }

    /// Move the cursor in the focused panel. Lists wrap around; the sampler
    /// grid moves by rows and stops at the edges.
    pub fn cursor_down(&mut self, columns: usize) {
        match self.panel {
            Panel::Themes => {
                let len = self.library.themes.len();
                if len > 0 {
                    self.theme_cursor = (self.theme_cursor + 1) % len;
                }
            }
            Panel::Playlist => {
                let len = self.active_tracks().len();
                if len > 0 {
                    self.track_cursor = (self.track_cursor + 1) % len;
                }
            }
            Panel::Sampler => {
                if self.slot_cursor + columns < self.slots {
                    self.slot_cursor += columns;
                }
            }
        }
    }

    pub fn cursor_up(&mut self, columns: usize) {
        match self.panel {
            Panel::Themes => {
                let len = self.library.themes.len();
                if len > 0 {
                    self.theme_cursor = (self.theme_cursor + len - 1) % len;
                }
            }
            Panel::Playlist => {
                let len = self.active_tracks().len();
                if len > 0 {
                    self.track_cursor = (self.track_cursor + len - 1) % len;
                }
            }
            Panel::Sampler => {
                if self.slot_cursor >= columns {
                    self.slot_cursor -= columns;
                }
            }
        }
    }

    /// Step sideways inside the sampler grid.
    pub fn slot_left(&mut self, columns: usize) {
        if self.panel == Panel::Sampler && self.slot_cursor % columns > 0 {
            self.slot_cursor -= 1;
        }
    }

    pub fn slot_right(&mut self, columns: usize) {
        if self.panel == Panel::Sampler
            && self.slot_cursor % columns + 1 < columns
            && self.slot_cursor + 1 < self.slots
        {
            self.slot_cursor += 1;
        }
    }

    pub fn focus_next_panel(&mut self) {
        self.panel = self.panel.next();
    }

    pub fn focus_prev_panel(&mut self) {
        self.panel = self.panel.prev();
    }

    /// Keep cursors inside their lists after removals.
    fn clamp_cursors(&mut self) {
        let themes = self.library.themes.len();
        if self.theme_cursor >= themes {
            self.theme_cursor = themes.saturating_sub(1);
        }
        let tracks = self.active_tracks().len();
        if self.track_cursor >= tracks {
            self.track_cursor = tracks.saturating_sub(1);
        }
    }

    /// Open the bottom prompt. Saving prefills the last used path.
    pub fn open_prompt(&mut self, prompt: Prompt) {
        self.input.clear();
        if prompt == Prompt::SaveLibrary {
            if let Some(path) = &self.library.path {
                self.input = path.display().to_string();
            }
        }
        self.prompt = Some(prompt);
    }

    pub fn close_prompt(&mut self) {
        self.prompt = None;
        self.input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }
}
