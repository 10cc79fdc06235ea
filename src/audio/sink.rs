//! Opening audio files as paused `rodio` sinks.
//!
//! Failures come back as status-line messages rather than panics: a
//! missing or corrupt file should never take the session down.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

/// Create a paused `Sink` for the file at `location`.
pub(super) fn create_sink(handle: &OutputStream, location: &Path) -> Result<Sink, String> {
    let file = File::open(location)
        .map_err(|e| format!("cannot open {}: {e}", location.display()))?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("cannot decode {}: {e}", location.display()))?;

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
