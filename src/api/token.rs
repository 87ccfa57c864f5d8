// Bearer-token persistence. The browser client keeps this in localStorage;
// out here it's a plain file under the config directory.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the saved token, if any. A missing file just means logged out.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() {
                    None
                } else {
                    Some(token)
                }
            }
            Err(_) => None,
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        debug!("saved session token to {}", self.path.display());
        Ok(())
    }

    /// Forget the session. Used on logout and whenever the server says 401.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("cleared session token");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));

        assert_eq!(store.load(), None);

        store.save("abc123").unwrap();
        assert_eq!(store.load(), Some("abc123".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_whitespace_only_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "\n  \n").unwrap();
        let store = TokenStore::new(path);
        assert_eq!(store.load(), None);
    }
}
