use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::model::{DEFAULT_LIBRARY_NAME, Library, Theme, Track};

fn track(name: &str) -> Track {
    Track {
        name: name.to_string(),
        location: PathBuf::from(format!("/music/{name}.mp3")),
    }
}

fn sample_library() -> Library {
    let mut library = Library::new();
    library.themes.push(Theme {
        name: "Battle".to_string(),
        tracks: vec![track("drums"), track("horns")],
    });
    library.themes.push(Theme {
        name: "Tavern".to_string(),
        tracks: vec![track("lute")],
    });
    library.set_effect(3, "door", PathBuf::from("/sfx/door.wav"));
    library
}

#[test]
fn new_library_is_empty_with_default_name() {
    let library = Library::new();
    assert_eq!(library.name, DEFAULT_LIBRARY_NAME);
    assert!(library.themes.is_empty());
    assert!(library.effects.is_empty());
    assert!(library.path.is_none());
}

#[test]
fn track_from_path_uses_file_stem() {
    let t = Track::from_path(Path::new("/music/Dragon Fight.ogg"));
    assert_eq!(t.name, "Dragon Fight");
    assert_eq!(t.location, PathBuf::from("/music/Dragon Fight.ogg"));
}

#[test]
fn add_theme_rejects_blank_and_duplicate_names() {
    let mut library = sample_library();
    assert!(library.add_theme("   ").is_err());
    assert!(library.add_theme("Battle").is_err());
    assert!(library.add_theme("Forest").is_ok());
    assert_eq!(library.themes.len(), 3);
}

#[test]
fn rename_theme_updates_exactly_one_and_keeps_tracks() {
    let mut library = sample_library();
    library.rename_theme("Battle", "War").unwrap();

    assert!(library.theme("Battle").is_none());
    let war = library.theme("War").unwrap();
    assert_eq!(war.tracks.len(), 2);
    assert_eq!(war.tracks[0].name, "drums");
    // The other theme is untouched.
    assert_eq!(library.theme("Tavern").unwrap().tracks.len(), 1);
}

#[test]
fn rename_theme_rejects_taken_names_but_allows_noop() {
    let mut library = sample_library();
    assert!(library.rename_theme("Battle", "Tavern").is_err());
    assert!(library.rename_theme("Battle", "Battle").is_ok());
    assert!(library.rename_theme("Nope", "Whatever").is_err());
}

#[test]
fn remove_theme_removes_exactly_one() {
    let mut library = sample_library();
    assert!(library.remove_theme("Battle"));
    assert_eq!(library.themes.len(), 1);
    assert_eq!(library.themes[0].name, "Tavern");
    assert!(!library.remove_theme("Battle"));
}

#[test]
fn set_effect_replaces_the_slot_assignment() {
    let mut library = sample_library();
    library.set_effect(3, "thunder", PathBuf::from("/sfx/thunder.wav"));

    assert_eq!(library.effects.len(), 1);
    let e = library.effect_at(3).unwrap();
    assert_eq!(e.name, "thunder");

    assert!(library.clear_effect(3));
    assert!(library.effect_at(3).is_none());
    assert!(!library.clear_effect(3));
}

#[test]
fn retain_effects_within_drops_out_of_grid_slots() {
    let mut library = Library::new();
    library.set_effect(2, "ok", PathBuf::from("/sfx/ok.wav"));
    library.set_effect(15, "edge", PathBuf::from("/sfx/edge.wav"));
    library.set_effect(40, "gone", PathBuf::from("/sfx/gone.wav"));

    library.retain_effects_within(16);
    assert!(library.effect_at(2).is_some());
    assert!(library.effect_at(15).is_some());
    assert!(library.effect_at(40).is_none());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("campaign.json");

    let mut library = sample_library();
    library.save(&path).unwrap();

    let loaded = Library::load(&path).unwrap();
    assert_eq!(loaded.name, "campaign");
    assert_eq!(loaded.themes, library.themes);
    assert_eq!(loaded.effects, library.effects);
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
}

#[test]
fn save_renames_library_after_the_file_stem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("winter_session.json");

    let mut library = Library::new();
    assert_eq!(library.name, DEFAULT_LIBRARY_NAME);
    library.save(&path).unwrap();

    assert_eq!(library.name, "winter_session");
    assert_eq!(library.path.as_deref(), Some(path.as_path()));
}

#[test]
fn failed_save_leaves_the_library_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("lib.json");

    let mut library = sample_library();
    assert!(library.save(&path).is_err());

    // Neither the stem rename nor the path sticks on failure.
    assert_eq!(library.name, DEFAULT_LIBRARY_NAME);
    assert!(library.path.is_none());
    assert_eq!(library.themes.len(), 2);
    assert!(library.effect_at(3).is_some());
}

#[test]
fn saved_json_omits_the_runtime_path_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.json");

    sample_library().save(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"themes\""));
    assert!(raw.contains("\"effects\""));
    assert!(!raw.contains("\"path\""));
}

#[test]
fn load_missing_file_falls_back_to_empty_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nothing_here.json");

    let (library, warning) = Library::load_or_default(&path);
    assert_eq!(library.name, DEFAULT_LIBRARY_NAME);
    assert!(library.themes.is_empty());
    assert!(warning.unwrap().contains("no library at"));
}

#[test]
fn load_corrupt_file_falls_back_to_empty_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ this is not json").unwrap();

    let (library, warning) = Library::load_or_default(&path);
    assert!(library.themes.is_empty());
    assert!(warning.unwrap().contains("could not load"));
}

#[test]
fn load_tolerates_missing_optional_sections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("minimal.json");
    fs::write(&path, r#"{ "name": "bare" }"#).unwrap();

    let library = Library::load(&path).unwrap();
    assert_eq!(library.name, "bare");
    assert!(library.themes.is_empty());
    assert!(library.effects.is_empty());
}
