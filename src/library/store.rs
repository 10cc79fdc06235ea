use std::error::Error;
use std::path::Path;
use std::{fmt, fs, io};

use super::model::Library;

/// Why a library file could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// Nothing exists at the given path.
    Missing,
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Missing => write!(f, "file not found"),
            LoadError::Io(e) => write!(f, "read failed: {e}"),
            LoadError::Parse(e) => write!(f, "not a valid library file: {e}"),
        }
    }
}

impl Error for LoadError {}

impl Library {
    /// Read a library from a JSON file. The file's path is remembered so a
    /// later save can default to it.
    pub fn load(path: &Path) -> Result<Library, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing);
        }
        let data = fs::read_to_string(path).map_err(LoadError::Io)?;
        let mut library: Library = serde_json::from_str(&data).map_err(LoadError::Parse)?;
        library.path = Some(path.to_path_buf());
        Ok(library)
    }

    /// Load a library, falling back to a fresh empty one when the file is
    /// missing or unreadable. The second value is a warning for the status
    /// line when the fallback was taken.
    pub fn load_or_default(path: &Path) -> (Library, Option<String>) {
        match Library::load(path) {
            Ok(library) => (library, None),
            Err(LoadError::Missing) => {
                let warning = format!("no library at {}, starting empty", path.display());
                (Library::new(), Some(warning))
            }
            Err(e) => {
                let warning = format!("could not load {}: {e}, starting empty", path.display());
                (Library::new(), Some(warning))
            }
        }
    }

    /// Write the library to `path` as pretty-printed JSON.
    ///
    /// On success the library takes its name from the file stem and remembers
    /// the path. On failure nothing changes.
    pub fn save(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut to_write = self.clone();
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            to_write.name = stem.to_string();
        }
        let data = serde_json::to_string_pretty(&to_write)?;
        fs::write(path, data)?;
        self.name = to_write.name;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}
