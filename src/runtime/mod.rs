//! Process setup and teardown around the terminal event loop.

use std::sync::mpsc;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::mpris::{ControlCmd, spawn_mpris};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let audio_player = AudioPlayer::new(settings.audio.clone());

    let (library, warning) = startup::initial_library(&settings);
    let mut app = App::new(library, settings.sampler.slots());
    // Attach the shared handles so the UI can show playback progress and
    // which sampler slots are sounding.
    app.set_playback_handle(audio_player.playback_handle());
    app.set_effects_handle(audio_player.effects_handle());
    if let Some(msg) = warning {
        app.set_status(msg);
    }

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = spawn_mpris(control_tx.clone());

    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let run_result = (|| -> Result<(), Box<dyn std::error::Error>> {
        let mut loop_state = event_loop::EventLoopState::new(&app);

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &audio_player,
            &mpris,
            &control_tx,
            &control_rx,
            &mut loop_state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
