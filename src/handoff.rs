use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::debug;

use crate::error::AppError;

/// Key the capture flow leaves the composed result under for the result view.
pub const RESULT_KEY: &str = "mulambo_result";

/// One-shot keyed handoff between the capture flow and the result view.
/// Values live as files under the platform data directory, one per key.
#[derive(Debug, Clone)]
pub struct HandoffStore {
    root: PathBuf,
}

impl HandoffStore {
    pub fn open() -> Result<Self, AppError> {
        let dirs = ProjectDirs::from("", "", "mulambo")
            .ok_or_else(|| AppError::Handoff("no home directory available".to_string()))?;
        Self::at(dirs.data_dir().join("handoff"))
    }

    /// Opens a store rooted at an explicit directory. Tests use this to stay
    /// out of the real data dir.
    pub fn at(root: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&root).map_err(|e| AppError::Handoff(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.key_path(key)?;
        debug!("Storing handoff key '{}' ({} bytes)", key, value.len());
        fs::write(path, value).map_err(|e| AppError::Handoff(e.to_string()))
    }

    /// Reads and consumes a key. Returns None when the key was never set or
    /// was already taken.
    pub fn take(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                fs::remove_file(&path).map_err(|e| AppError::Handoff(e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Handoff(e.to_string())),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, AppError> {
        // Keys are fixed identifiers, not user input; reject separators
        // anyway so a bad key cannot escape the store root.
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(AppError::Handoff(format!("invalid handoff key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}
