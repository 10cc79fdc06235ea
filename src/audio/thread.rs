use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;
use crate::library::Track;

use super::advance;
use super::sink::create_sink;
use super::types::{AudioCmd, EffectsHandle, NowPlaying, PlaybackHandle};

/// Music-side state owned by the audio thread.
///
/// Effects live outside this struct: each assigned slot gets its own sink
/// and never interacts with the playlist cursor.
struct MusicState {
    playlist: Vec<Track>,
    cursor: usize,
    repeat: bool,
    random: bool,
    sink: Option<Sink>,
    paused: bool,
    current: Option<Track>,
}

impl MusicState {
    fn new() -> Self {
        Self {
            playlist: Vec::new(),
            cursor: 0,
            repeat: false,
            random: false,
            sink: None,
            paused: true,
            current: None,
        }
    }

    /// Swap the playlist without interrupting what is sounding. The cursor
    /// follows the current track into the new list when it is still there.
    fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        self.cursor = self
            .current
            .as_ref()
            .and_then(|c| self.playlist.iter().position(|t| t.location == c.location))
            .unwrap_or(0);
    }

    fn play_index(&mut self, i: usize, stream: &OutputStream, playback_info: &PlaybackHandle) {
        // Out-of-range indices are ignored; the playlist may have shrunk
        // since the command was sent.
        let Some(track) = self.playlist.get(i).cloned() else {
            return;
        };
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        match create_sink(stream, &track.location) {
            Ok(new_sink) => {
                new_sink.play();
                let duration = read_duration(&track.location);
                self.sink = Some(new_sink);
                self.cursor = i;
                self.paused = false;
                self.current = Some(track.clone());
                if let Ok(mut info) = playback_info.lock() {
                    info.current = Some(NowPlaying {
                        name: track.name,
                        location: track.location,
                        duration,
                    });
                    info.elapsed = Duration::ZERO;
                    info.playing = true;
                }
            }
            Err(e) => {
                self.sink = None;
                self.current = None;
                self.paused = true;
                if let Ok(mut info) = playback_info.lock() {
                    info.current = None;
                    info.elapsed = Duration::ZERO;
                    info.playing = false;
                    info.notice = Some(e);
                }
            }
        }
    }

    fn stop(&mut self, playback_info: &PlaybackHandle) {
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        self.sink = None;
        self.current = None;
        self.paused = true;
        if let Ok(mut info) = playback_info.lock() {
            info.current = None;
            info.elapsed = Duration::ZERO;
            info.playing = false;
        }
    }

    fn toggle_pause(&mut self, playback_info: &PlaybackHandle) {
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            s.play();
        } else {
            s.pause();
        }
        self.paused = !self.paused;
        if let Ok(mut info) = playback_info.lock() {
            info.playing = !self.paused;
        }
    }

    fn skip_next(&mut self, stream: &OutputStream, playback_info: &PlaybackHandle) {
        if let Some(next) = advance::manual(self.cursor, self.playlist.len(), self.random) {
            self.play_index(next, stream, playback_info);
        }
    }

    /// Called on the idle tick. When the current track has drained, either
    /// replay it (repeat) or move on; an empty playlist just stops.
    fn check_track_end(&mut self, stream: &OutputStream, playback_info: &PlaybackHandle) {
        let finished = self.sink.as_ref().is_some_and(|s| !self.paused && s.empty());
        if !finished {
            return;
        }
        match advance::auto(self.cursor, self.playlist.len(), self.repeat, self.random) {
            Some(next) => self.play_index(next, stream, playback_info),
            None => self.stop(playback_info),
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    effects_info: EffectsHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // With no output device the thread winds down and every later send
        // fails; the app keeps running without sound.
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("wyrmsong: no audio output device: {e}");
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut music = MusicState::new();
        let mut effects: HashMap<usize, Sink> = HashMap::new();

        // Spawn a ticker thread to update playback_info.elapsed periodically.
        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));
        let info_for_ticker = playback_info.clone();
        thread::spawn(move || loop {
            thread::sleep(tick);
            if let Ok(mut info) = info_for_ticker.lock() {
                if info.playing {
                    info.elapsed += tick;
                }
            }
        });

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => match cmd {
                    AudioCmd::SetPlaylist(tracks) => music.set_playlist(tracks),

                    AudioCmd::Play(i) => music.play_index(i, &stream, &playback_info),

                    AudioCmd::Stop => music.stop(&playback_info),

                    AudioCmd::TogglePause => music.toggle_pause(&playback_info),

                    AudioCmd::Next => music.skip_next(&stream, &playback_info),

                    AudioCmd::SetRepeat(on) => music.repeat = on,

                    AudioCmd::SetRandom(on) => music.random = on,

                    AudioCmd::ToggleEffect {
                        slot,
                        name,
                        location,
                    } => {
                        if let Some(sink) = effects.remove(&slot) {
                            sink.stop();
                            mark_effect(&effects_info, slot, false);
                        } else {
                            match create_sink(&stream, &location) {
                                Ok(sink) => {
                                    sink.play();
                                    effects.insert(slot, sink);
                                    mark_effect(&effects_info, slot, true);
                                }
                                Err(e) => notify(&playback_info, format!("effect '{name}': {e}")),
                            }
                        }
                    }

                    AudioCmd::StopEffect(slot) => {
                        if let Some(sink) = effects.remove(&slot) {
                            sink.stop();
                            mark_effect(&effects_info, slot, false);
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(s) = music.sink.as_ref() {
                            // Fade out gently before stopping.
                            fade_out_sink(s, fade_out_ms);
                            s.stop();
                        }
                        for (_, sink) in effects.drain() {
                            sink.stop();
                        }
                        if let Ok(mut active) = effects_info.lock() {
                            active.clear();
                        }
                        // Update shared state so UI/MPRIS don't keep showing Playing.
                        if let Ok(mut info) = playback_info.lock() {
                            info.playing = false;
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Periodic housekeeping: music auto-advance, finished effects.
                    music.check_track_end(&stream, &playback_info);
                    sweep_finished_effects(&mut effects, &effects_info);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn read_duration(location: &Path) -> Option<Duration> {
    lofty::read_from_path(location)
        .ok()
        .map(|tagged| tagged.properties().duration())
}

fn mark_effect(effects_info: &EffectsHandle, slot: usize, active: bool) {
    if let Ok(mut set) = effects_info.lock() {
        if active {
            set.insert(slot);
        } else {
            set.remove(&slot);
        }
    }
}

fn notify(playback_info: &PlaybackHandle, message: String) {
    if let Ok(mut info) = playback_info.lock() {
        info.notice = Some(message);
    }
}

/// Drop sinks that played their one-shot to the end so the slot can fire again.
fn sweep_finished_effects(effects: &mut HashMap<usize, Sink>, effects_info: &EffectsHandle) {
    let finished: Vec<usize> = effects
        .iter()
        .filter(|(_, sink)| sink.empty())
        .map(|(&slot, _)| slot)
        .collect();
    for slot in finished {
        effects.remove(&slot);
        mark_effect(effects_info, slot, false);
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
