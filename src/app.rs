//! UI-facing application state.
//!
//! The `App` model lives in `app::model` and holds the loaded library,
//! panel focus, prompt state and playback flags.

mod model;

pub use model::*;
