use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();

    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext)
}

fn is_hidden(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|s| s.to_str()),
        Some(name) if name.starts_with('.')
    )
}

/// Collect the audio files under `dir` as tracks named after their file
/// stems, sorted case-insensitively.
pub fn scan_dir(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // A non-recursive scan never leaves the directory itself.
    match (settings.recursive, settings.max_depth) {
        (false, _) => walker = walker.max_depth(1),
        (true, Some(d)) => walker = walker.max_depth(d),
        (true, None) => {}
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || settings.include_hidden || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .filter(|e| settings.include_hidden || !is_hidden(e.path()))
        .map(|e| Track::from_path(e.path()))
        .collect();

    tracks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracks
}
