use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A single named durable slot holding the serialized favorites collection.
///
/// Absence of the slot means "empty collection". Writing an empty collection
/// is disallowed by contract; the slot must be deleted instead, so the two
/// empty representations stay unified.
pub trait FavoritesSlot: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
    fn delete(&self) -> Result<()>;
}

/// Slot backed by one JSON file under the data directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("reading {}", self.path.display())),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("creating data directory {}", parent.display()))?;
        }
        fs::write(&self.path, contents).context(format!("writing {}", self.path.display()))
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("deleting {}", self.path.display())),
        }
    }
}
