use std::collections::HashSet;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, EffectsHandle, PlaybackHandle, PlaybackInfo};

pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    effects: EffectsHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let playback = Arc::new(Mutex::new(PlaybackInfo::default()));
        let effects = Arc::new(Mutex::new(HashSet::new()));

        let worker = spawn_audio_thread(rx, playback.clone(), effects.clone(), audio_settings);

        Self {
            tx,
            playback,
            effects,
            join: Mutex::new(Some(worker)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn effects_handle(&self) -> EffectsHandle {
        self.effects.clone()
    }

    /// Send a command. Fails only when the audio thread is gone (no output
    /// device at startup); the app then keeps running without sound.
    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        let worker = self.join.lock().ok().and_then(|mut j| j.take());
        if let Some(h) = worker {
            let _ = h.join();
        }
    }
}
