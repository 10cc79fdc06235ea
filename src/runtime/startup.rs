use std::env;
use std::path::PathBuf;

use crate::config;
use crate::library::Library;

/// Pick the library file to open at startup and load it.
///
/// The first command line argument wins, then `library.default_path` from
/// the config. Without a candidate the session starts on a fresh library.
/// Load problems come back as a status line warning, never as an error.
pub fn initial_library(settings: &config::Settings) -> (Library, Option<String>) {
    let candidate = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.default_path.clone().map(PathBuf::from));

    let (mut library, warning) = match candidate {
        Some(path) => Library::load_or_default(&path),
        None => (Library::new(), None),
    };

    // A file saved under a larger grid may assign slots this one lacks.
    library.retain_effects_within(settings.sampler.slots());

    (library, warning)
}
