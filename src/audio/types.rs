//! Commands understood by the audio thread and the shared state the UI
//! reads back (playback info, active effects).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the playlist with the active theme's tracks. Does not
    /// interrupt whatever is currently sounding.
    SetPlaylist(Vec<Track>),
    /// Start playing the playlist entry at the given index.
    Play(usize),
    /// Stop music playback. Running effects are left alone.
    Stop,
    /// Toggle pause/resume of the current track.
    TogglePause,
    /// Skip to the next track (wrapping, or random when enabled).
    Next,
    /// When on, a finished track replays instead of advancing.
    SetRepeat(bool),
    /// When on, advancement picks a uniformly random playlist index.
    SetRandom(bool),
    /// Start the effect if its slot is silent, stop it otherwise.
    ToggleEffect {
        slot: usize,
        name: String,
        location: PathBuf,
    },
    /// Silence a slot regardless of its state (used when unassigning).
    StopEffect(usize),
    /// Shut the audio thread down. The music fades out over `fade_out_ms`
    /// (zero cuts it instantly); effect slots just stop.
    Quit { fade_out_ms: u64 },
}

/// The track currently loaded in the music player.
///
/// Keyed by location rather than playlist index so it stays meaningful
/// when the playlist is swapped out from under it.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub name: String,
    pub location: PathBuf,
    /// Total length read from the file at play time, when available.
    pub duration: Option<Duration>,
}

/// What the music player is doing right now, as seen by the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Track loaded in the music player, if any.
    pub current: Option<NowPlaying>,
    /// How far into the current track playback has gotten.
    pub elapsed: Duration,
    /// False while paused or stopped.
    pub playing: bool,
    /// A one-shot warning for the status line (unreadable file and such).
    pub notice: Option<String>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
/// Sampler slots with a live sink, for highlighting in the grid.
pub type EffectsHandle = Arc<Mutex<HashSet<usize>>>;
