//! MPRIS (org.mpris.MediaPlayer2) integration over D-Bus.
//!
//! A background thread owns the session bus connection. The UI pushes
//! playback state in through `MprisHandle`; remote commands come back on
//! a channel and are handled by the event loop like any other input.

use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use async_io::block_on;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::app::PlaybackState;
use crate::audio::NowPlaying;

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";

#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<u64>,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: mpsc::Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        let _ = self.notify.send(());
    }

    /// Publish the current track. `index` is its playlist position, used to
    /// build a stable object path for `mpris:trackid`.
    pub fn set_track_metadata(&self, index: Option<usize>, now: Option<&NowPlaying>) {
        if let Ok(mut s) = self.state.lock() {
            s.title = now.map(|np| np.name.clone());
            s.url = now.map(|np| format!("file://{}", np.location.display()));
            s.length_micros = now.and_then(|np| np.duration).map(|d| d.as_micros() as u64);
            s.track_id = index.and_then(|i| {
                ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}"))
                    .ok()
                    .map(OwnedObjectPath::from)
            });
        }
        let _ = self.notify.send(());
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // There is no window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "wyrmsong"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        Vec::new()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        // The playlist only moves forward; going back is not a thing here.
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        match self.state.lock().map(|s| s.playback) {
            Ok(PlaybackState::Playing) => "Playing",
            Ok(PlaybackState::Paused) => "Paused",
            _ => "Stopped",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        // Enough metadata for `playerctl metadata` to show something useful.
        let mut meta = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return meta;
        };

        let mut put = |key: &str, value: Option<Value<'static>>| {
            if let Some(owned) = value.and_then(|v| OwnedValue::try_from(v).ok()) {
                meta.insert(key.to_string(), owned);
            }
        };

        put("mpris:trackid", s.track_id.clone().map(Value::from));
        put("xesam:title", s.title.clone().map(Value::from));
        put("xesam:url", s.url.clone().map(Value::from));
        put("mpris:length", s.length_micros.map(|l| Value::from(l as i64)));
        meta
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let shared = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let bus_state = shared.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("MPRIS: session bus unavailable: {e}");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.wyrmsong")
                .await
            {
                eprintln!("MPRIS: could not claim the bus name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(MPRIS_PATH, RootIface { tx: tx.clone() })
                .await
            {
                eprintln!("MPRIS: root interface registration failed: {e}");
                return;
            }

            let player = PlayerIface {
                tx,
                state: bus_state,
            };
            if let Err(e) = object_server.at(MPRIS_PATH, player).await {
                eprintln!("MPRIS: player interface registration failed: {e}");
                return;
            }

            let player_ref = match object_server.interface::<_, PlayerIface>(MPRIS_PATH).await {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("MPRIS: player interface lookup failed: {e}");
                    return;
                }
            };

            // Forward state pushes as PropertiesChanged signals until the
            // app side hangs up. Method calls are served by zbus's own
            // executor, so blocking here is fine.
            while notify_rx.recv().is_ok() {
                let iface = player_ref.get().await;
                let emitter = player_ref.signal_emitter();
                let _ = iface.playback_status_changed(emitter).await;
                let _ = iface.metadata_changed(emitter).await;
            }
        });
    });

    MprisHandle {
        state: shared,
        notify: notify_tx,
    }
}

#[cfg(test)]
mod tests;
