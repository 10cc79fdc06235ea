use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Panel, PlaybackState, Prompt};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::library::{self, Library, Track};
use crate::mpris::ControlCmd;
use crate::mpris::MprisHandle;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// What the loop remembers between iterations, mostly to avoid spamming
/// MPRIS with unchanged values.
pub struct EventLoopState {
    /// Location of the track MPRIS was last told about.
    pub last_mpris_location: Option<PathBuf>,
    /// Playback state MPRIS was last told about.
    pub last_mpris_playback: PlaybackState,
}

impl EventLoopState {
    pub fn new(app: &App) -> Self {
        Self {
            last_mpris_location: None,
            last_mpris_playback: app.playback,
        }
    }
}

/// The terminal event loop. Draws the UI, feeds key presses to the panels,
/// and mirrors the audio thread's state out to MPRIS. Returns once the user
/// quits or an MPRIS client asks us to.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Keep the audio thread's playlist in sync with the active theme.
        if app.playlist_dirty {
            let _ = audio_player.send(AudioCmd::SetPlaylist(app.active_tracks().to_vec()));
            app.clear_playlist_dirty();
        }

        // Mirror the audio thread's state. The handle is cloned out of `app`
        // first so `app` stays free for the mutations below.
        let snapshot = app.playback_handle.as_ref().cloned().and_then(|handle| {
            let mut info = handle.lock().ok()?;
            Some((
                info.current.as_ref().map(|n| n.location.clone()),
                info.playing,
                info.notice.take(),
            ))
        });

        let mut location_snapshot: Option<PathBuf> = None;
        if let Some((location, is_playing, notice)) = snapshot {
            app.playback = match (&location, is_playing) {
                (None, _) => PlaybackState::Stopped,
                (Some(_), true) => PlaybackState::Playing,
                (Some(_), false) => PlaybackState::Paused,
            };
            location_snapshot = location;
            if let Some(msg) = notice {
                app.set_status(msg);
            }
        }

        // Keep MPRIS in sync even when playback changes come from XF86/media
        // keys or auto-advance.
        if location_snapshot != state.last_mpris_location
            || app.playback != state.last_mpris_playback
        {
            update_mpris(mpris, app);
            state.last_mpris_location = location_snapshot;
            state.last_mpris_playback = app.playback;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.sampler))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, audio_player, mpris)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, control_tx)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        ControlCmd::Quit => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        // Play/Pause collapses onto the other two commands.
        ControlCmd::PlayPause => {
            let mapped = if app.playback == PlaybackState::Playing {
                ControlCmd::Pause
            } else {
                ControlCmd::Play
            };
            return handle_control_cmd(mapped, settings, app, audio_player, mpris);
        }
        ControlCmd::Play => match app.playback {
            // Resuming is a toggle; anything else restarts at the cursor.
            PlaybackState::Paused => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped | PlaybackState::Playing => {
                if !app.active_tracks().is_empty() {
                    let _ = audio_player.send(AudioCmd::Play(app.track_cursor));
                    app.playback = PlaybackState::Playing;
                }
            }
        },
        ControlCmd::Pause => {
            if app.playback == PlaybackState::Playing {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Paused;
            }
        }
        ControlCmd::Stop => {
            let _ = audio_player.send(AudioCmd::Stop);
            app.playback = PlaybackState::Stopped;
        }
        ControlCmd::Next => {
            if !app.active_tracks().is_empty() {
                let _ = audio_player.send(AudioCmd::Next);
                app.playback = PlaybackState::Playing;
            }
        }
    }

    update_mpris(mpris, app);
    Ok(false)
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> Result<bool, Box<dyn std::error::Error>> {
    // The prompt line captures everything while it is open.
    if app.prompt.is_some() {
        match key.code {
            KeyCode::Esc => app.close_prompt(),
            KeyCode::Backspace => app.pop_input_char(),
            KeyCode::Enter => commit_prompt(settings, app, audio_player),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_input_char(c);
                }
            }
            _ => {}
        }
        return Ok(false);
    }

    // Global keys first, then whatever the focused panel binds.
    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_prompt(Prompt::SaveLibrary);
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_prompt(Prompt::LoadLibrary);
        }
        KeyCode::Tab => app.focus_next_panel(),
        KeyCode::BackTab => app.focus_prev_panel(),
        _ => match app.panel {
            Panel::Themes => handle_themes_key(key, settings, app),
            Panel::Playlist => handle_playlist_key(key, settings, app, audio_player, control_tx),
            Panel::Sampler => handle_sampler_key(key, settings, app, audio_player),
        },
    }

    Ok(false)
}

fn handle_themes_key(key: KeyEvent, settings: &config::Settings, app: &mut App) {
    let columns = settings.sampler.columns;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(columns),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(columns),
        KeyCode::Char('h') | KeyCode::Left => app.focus_prev_panel(),
        KeyCode::Char('l') | KeyCode::Right => app.focus_next_panel(),
        KeyCode::Enter => {
            app.select_theme(app.theme_cursor);
        }
        KeyCode::Char('n') => app.open_prompt(Prompt::NewTheme),
        KeyCode::Char('r') => {
            if let Some(theme) = app.library.themes.get(app.theme_cursor) {
                let theme = theme.name.clone();
                app.open_prompt(Prompt::RenameTheme { theme });
            }
        }
        KeyCode::Char('d') => {
            if let Some(theme) = app.library.themes.get(app.theme_cursor) {
                let theme = theme.name.clone();
                app.open_prompt(Prompt::DeleteTheme { theme });
            }
        }
        _ => {}
    }
}

fn handle_playlist_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    control_tx: &mpsc::Sender<ControlCmd>,
) {
    let columns = settings.sampler.columns;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(columns),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(columns),
        KeyCode::Char('h') | KeyCode::Left => app.focus_prev_panel(),
        KeyCode::Char('l') | KeyCode::Right => app.focus_next_panel(),
        KeyCode::Enter => {
            if !app.active_tracks().is_empty() {
                let _ = audio_player.send(AudioCmd::Play(app.track_cursor));
                app.playback = PlaybackState::Playing;
            }
        }
        // Transport keys behave like their MPRIS counterparts.
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('s') => {
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('n') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('r') => {
            app.repeat = !app.repeat;
            let _ = audio_player.send(AudioCmd::SetRepeat(app.repeat));
        }
        KeyCode::Char('z') => {
            app.random = !app.random;
            let _ = audio_player.send(AudioCmd::SetRandom(app.random));
        }
        KeyCode::Char('a') => {
            if app.active_theme.is_some() {
                app.open_prompt(Prompt::AddTracks);
            } else {
                app.set_status("select a theme first");
            }
        }
        KeyCode::Char('d') => {
            if let Some(track) = app.remove_selected_track() {
                app.set_status(format!("removed '{}'", track.name));
            }
        }
        _ => {}
    }
}

fn handle_sampler_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
) {
    let columns = settings.sampler.columns;
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.slot_left(columns),
        KeyCode::Char('l') | KeyCode::Right => app.slot_right(columns),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(columns),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(columns),
        KeyCode::Enter => {
            let effect = app.library.effect_at(app.slot_cursor).cloned();
            match effect {
                Some(effect) => {
                    let _ = audio_player.send(AudioCmd::ToggleEffect {
                        slot: effect.slot,
                        name: effect.name,
                        location: effect.location,
                    });
                }
                None => app.set_status(format!("slot {} is empty", app.slot_cursor + 1)),
            }
        }
        KeyCode::Char('a') => {
            app.open_prompt(Prompt::AssignEffect {
                slot: app.slot_cursor,
            });
        }
        KeyCode::Char('d') => {
            if app.clear_effect(app.slot_cursor) {
                let _ = audio_player.send(AudioCmd::StopEffect(app.slot_cursor));
                app.set_status(format!("slot {} cleared", app.slot_cursor + 1));
            }
        }
        _ => {}
    }
}

fn commit_prompt(settings: &config::Settings, app: &mut App, audio_player: &AudioPlayer) {
    let Some(prompt) = app.prompt.clone() else {
        return;
    };
    let input = app.input.trim().to_string();
    app.close_prompt();

    match prompt {
        Prompt::NewTheme => match app.add_theme(&input) {
            Ok(()) => app.set_status(format!("theme '{input}' created")),
            Err(e) => app.set_status(e),
        },
        Prompt::RenameTheme { theme } => match app.rename_theme(&theme, &input) {
            Ok(()) => app.set_status(format!("renamed '{theme}' to '{input}'")),
            Err(e) => app.set_status(e),
        },
        Prompt::DeleteTheme { theme } => {
            if matches!(input.to_lowercase().as_str(), "y" | "yes")
                && app.delete_theme(&theme)
            {
                app.set_status(format!("deleted '{theme}'"));
            }
        }
        Prompt::AddTracks => add_tracks_from(&input, settings, app),
        Prompt::AssignEffect { slot } => {
            assign_effect_from(&input, slot, settings, app, audio_player)
        }
        Prompt::SaveLibrary => save_library_to(&input, app),
        Prompt::LoadLibrary => load_library_from(&input, app, audio_player),
    }
}

/// Expand a leading `~/` so prompts accept shell-style paths.
fn expand_tilde(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(input)
}

/// Add a single audio file or a whole directory to the active theme.
fn add_tracks_from(input: &str, settings: &config::Settings, app: &mut App) {
    if input.is_empty() {
        return;
    }
    let path = expand_tilde(input);

    if path.is_dir() {
        let tracks = library::scan_dir(&path, &settings.library);
        if tracks.is_empty() {
            app.set_status(format!("no audio files under {}", path.display()));
            return;
        }
        match app.add_tracks(tracks) {
            Ok(1) => app.set_status("added 1 track"),
            Ok(count) => app.set_status(format!("added {count} tracks")),
            Err(e) => app.set_status(e),
        }
    } else if path.is_file() {
        if !library::is_audio_file(&path, &settings.library) {
            app.set_status(format!("{} is not an audio file", path.display()));
            return;
        }
        let track = Track::from_path(&path);
        let name = track.name.clone();
        match app.add_tracks(vec![track]) {
            Ok(_) => app.set_status(format!("added '{name}'")),
            Err(e) => app.set_status(e),
        }
    } else {
        app.set_status(format!("no such file: {}", path.display()));
    }
}

fn assign_effect_from(
    input: &str,
    slot: usize,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
) {
    if input.is_empty() {
        return;
    }
    let path = expand_tilde(input);
    if !path.is_file() || !library::is_audio_file(&path, &settings.library) {
        app.set_status(format!("{} is not an audio file", path.display()));
        return;
    }

    // Silence whatever the slot was sounding under its old assignment.
    let _ = audio_player.send(AudioCmd::StopEffect(slot));

    let track = Track::from_path(&path);
    let name = track.name.clone();
    app.assign_effect(slot, track);
    app.set_status(format!("slot {} plays '{name}'", slot + 1));
}

fn save_library_to(input: &str, app: &mut App) {
    if input.is_empty() {
        app.set_status("save needs a path");
        return;
    }
    let mut path = expand_tilde(input);
    if path.extension().is_none() {
        path.set_extension("json");
    }

    match app.library.save(&path) {
        Ok(()) => {
            app.unsaved = false;
            app.set_status(format!("saved to {}", path.display()));
        }
        Err(e) => app.set_status(format!("save failed: {e}")),
    }
}

/// Load a library from disk. A failed load keeps the current library; a
/// successful one swaps it in and silences every sampler slot.
fn load_library_from(input: &str, app: &mut App, audio_player: &AudioPlayer) {
    if input.is_empty() {
        app.set_status("load needs a path");
        return;
    }
    let path = expand_tilde(input);

    match Library::load(&path) {
        Ok(library) => {
            for slot in 0..app.slots {
                let _ = audio_player.send(AudioCmd::StopEffect(slot));
            }
            let name = library.name.clone();
            app.replace_library(library);
            app.set_status(format!("loaded '{name}'"));
        }
        Err(e) => app.set_status(format!("load failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (config::Settings, App, AudioPlayer) {
        let settings = config::Settings::default();
        let app = App::new(Library::new(), settings.sampler.slots());
        let player = AudioPlayer::new(settings.audio.clone());
        (settings, app, player)
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn h_and_l_switch_panels_from_the_list_panels() {
        let (settings, mut app, player) = fixture();
        let (tx, _rx) = mpsc::channel();

        assert_eq!(app.panel, Panel::Themes);
        handle_key_event(press('l'), &settings, &mut app, &player, &tx).unwrap();
        assert_eq!(app.panel, Panel::Playlist);

        handle_key_event(press('h'), &settings, &mut app, &player, &tx).unwrap();
        assert_eq!(app.panel, Panel::Themes);
    }

    #[test]
    fn the_sampler_keeps_h_and_l_for_grid_movement() {
        let (settings, mut app, player) = fixture();
        let (tx, _rx) = mpsc::channel();

        app.panel = Panel::Sampler;
        app.slot_cursor = 1;
        handle_key_event(press('h'), &settings, &mut app, &player, &tx).unwrap();
        assert_eq!(app.panel, Panel::Sampler);
        assert_eq!(app.slot_cursor, 0);

        handle_key_event(press('l'), &settings, &mut app, &player, &tx).unwrap();
        assert_eq!(app.panel, Panel::Sampler);
        assert_eq!(app.slot_cursor, 1);
    }
}
