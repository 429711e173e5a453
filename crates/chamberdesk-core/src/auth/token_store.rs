use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token file name in the data directory
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Holder of the single bearer credential, persisted across restarts.
///
/// One store is owned by the application and handed by reference to whatever
/// needs the credential (the session gate, request builders). Writes happen
/// only at login ([`TokenStore::set`]) and logout or rejection
/// ([`TokenStore::clear`], [`TokenStore::clear_if_matches`]).
#[derive(Debug)]
pub struct TokenStore {
    dir: PathBuf,
    token: Option<String>,
}

impl TokenStore {
    /// An empty store backed by `dir`. Nothing is read from disk.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, token: None }
    }

    /// Open the store at `dir`, picking up a token saved by a previous run.
    pub fn load(dir: PathBuf) -> Result<Self> {
        let mut store = Self::new(dir);
        let path = store.path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read token file")?;
            let stored: StoredToken = serde_json::from_str(&contents)
                .context("Failed to parse token file")?;
            if !stored.token.is_empty() {
                store.token = Some(stored.token);
            }
        }
        debug!(has_token = store.token.is_some(), "Token store loaded");
        Ok(store)
    }

    /// Overwrite the stored credential and persist it.
    pub fn set(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        std::fs::create_dir_all(&self.dir).context("Failed to create data directory")?;
        let contents = serde_json::to_string(&StoredToken { token: token.clone() })?;
        std::fs::write(self.path(), contents).context("Failed to write token file")?;
        self.token = Some(token);
        Ok(())
    }

    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none()
    }

    /// Remove the credential. Clearing an empty store is a no-op.
    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    /// Clear only if the stored credential is still `token`.
    ///
    /// Returns whether anything was cleared.
    pub fn clear_if_matches(&mut self, token: &str) -> Result<bool> {
        if self.token.as_deref() == Some(token) {
            self.clear()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}
