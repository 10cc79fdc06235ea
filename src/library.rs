//! The library: themes of background tracks, sampler effect assignments,
//! and their JSON persistence.

mod import;
mod model;
mod store;

pub(crate) use import::is_audio_file;
pub use import::scan_dir;
pub use model::{DEFAULT_LIBRARY_NAME, EffectSlot, Library, Theme, Track};
pub use store::LoadError;

#[cfg(test)]
mod tests;
