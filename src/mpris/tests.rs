use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn player_iface() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<ControlCmd>) {
    let shared = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel();
    let iface = PlayerIface {
        tx,
        state: shared.clone(),
    };
    (iface, shared, rx)
}

fn goblin_march() -> NowPlaying {
    NowPlaying {
        name: "Goblin March".to_string(),
        location: PathBuf::from("/tmp/ost/goblin-march.mp3"),
        duration: Some(Duration::from_micros(1_234_567)),
    }
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let shared = Arc::new(Mutex::new(SharedState::default()));
    let (notify, _keep) = mpsc::channel();
    let handle = MprisHandle {
        state: shared.clone(),
        notify,
    };

    let now = goblin_march();
    handle.set_track_metadata(Some(12), Some(&now));

    {
        let s = shared.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Goblin March"));
        assert!(s.url.as_deref().unwrap().ends_with("/tmp/ost/goblin-march.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/12")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = shared.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (iface, shared, _rx) = player_iface();

    for (playback, label) in [
        (PlaybackState::Stopped, "Stopped"),
        (PlaybackState::Playing, "Playing"),
        (PlaybackState::Paused, "Paused"),
    ] {
        shared.lock().unwrap().playback = playback;
        assert_eq!(iface.playback_status(), label);
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, shared, _rx) = player_iface();

    {
        let mut s = shared.lock().unwrap();
        s.title = Some("Ambush at the Ford".to_string());
        s.url = Some("file:///tmp/ost/ambush.mp3".to_string());
        s.length_micros = Some(9_000_000);
        s.track_id = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/3")
            .ok()
            .map(OwnedObjectPath::from);
    }

    let map = iface.metadata();
    for key in ["mpris:trackid", "xesam:title", "xesam:url", "mpris:length"] {
        assert!(map.contains_key(key), "missing key: {key}");
    }
}

#[test]
fn next_sends_a_command_but_previous_stays_quiet() {
    let (iface, _shared, rx) = player_iface();

    assert!(iface.can_go_next());
    assert!(!iface.can_go_previous());

    iface.next();
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Next)));

    iface.previous();
    assert!(rx.try_recv().is_err());
}
