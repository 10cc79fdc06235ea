use crate::app::App;
use crate::mpris::MprisHandle;

/// Push the current track and playback state out over MPRIS.
///
/// The track index is resolved against the active theme by location; a
/// track sounding past a playlist swap simply publishes without one.
pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let now = app.now_playing();
    let index = now.as_ref().and_then(|n| {
        app.active_tracks()
            .iter()
            .position(|t| t.location == n.location)
    });

    mpris.set_track_metadata(index, now.as_ref());
    mpris.set_playback(app.playback);
}
