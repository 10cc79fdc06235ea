//! Audio playback on a dedicated thread.
//!
//! One background thread owns the rodio output stream and drives two
//! independent layers: the music playlist (a single sink advancing through
//! the active theme) and the sampler effects (one sink per slot). The rest
//! of the app talks to it through `AudioCmd` messages and reads state back
//! through shared handles.

mod advance;
mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, EffectsHandle, NowPlaying, PlaybackHandle, PlaybackInfo};
