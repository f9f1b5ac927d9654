//! Sudo credential acquisition and caching
//!
//! The password is persisted in plaintext at a fixed, owner-only path so
//! later runs (and the privilege-priming helper) can reuse it without a
//! prompt. The cached value is never re-validated against sudo; a stale
//! password surfaces as elevation failures in the launched workloads.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::{Error, Result};

/// Where the credential for the current run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read back from the cache file, no prompt
    Cached,
    /// Entered interactively this run and persisted
    Prompted,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Prompted => write!(f, "prompted"),
        }
    }
}

/// Filesystem-backed store for the sudo password
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store over the given cache file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a credential is already cached
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }

    /// Read the cached credential, if any
    ///
    /// A single trailing newline is tolerated so hand-created cache files
    /// behave the same as prompted ones.
    ///
    /// # Errors
    ///
    /// Returns error if the cache file exists but cannot be read.
    pub fn load(&self) -> Result<Option<SecretString>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Credential(format!(
                "failed to read credential cache {}: {e}",
                self.path.display()
            ))
        })?;

        let value = content.strip_suffix('\n').unwrap_or(&content);
        Ok(Some(SecretString::from(value.to_string())))
    }

    /// Prompt interactively (input masked) and persist the entered value
    ///
    /// The file is written with owner-only permissions (0600) and contains
    /// exactly the entered string, no trailing newline.
    ///
    /// # Errors
    ///
    /// Returns error if the prompt is aborted or the file cannot be written.
    pub fn prompt_and_save(&self) -> Result<SecretString> {
        let password = dialoguer::Password::new()
            .with_prompt("sudo password")
            .interact()
            .map_err(|e| Error::Credential(format!("password prompt failed: {e}")))?;

        self.save(&password)?;
        Ok(SecretString::from(password))
    }

    /// Persist a credential value with owner-only permissions
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written or its mode cannot be set.
    pub fn save(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        tracing::info!(path = %self.path.display(), "credential cached");
        Ok(())
    }

    /// Return a usable credential, prompting at most once across runs
    ///
    /// Cache hit returns the stored value verbatim; a miss prompts and
    /// persists before returning.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be read or the prompt fails.
    pub fn obtain(&self) -> Result<(SecretString, CredentialSource)> {
        if let Some(secret) = self.load()? {
            tracing::debug!(path = %self.path.display(), "using cached credential");
            return Ok((secret, CredentialSource::Cached));
        }

        let secret = self.prompt_and_save()?;
        Ok((secret, CredentialSource::Prompted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join(".tempaccess"))
    }

    #[test]
    fn load_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.is_cached());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("hunter2").unwrap();
        assert!(store.is_cached());

        let secret = store.load().unwrap().unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");

        // The file holds exactly the entered string, no trailing whitespace
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "hunter2");
    }

    #[cfg(unix)]
    #[test]
    fn save_restricts_permissions_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("hunter2").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn load_tolerates_single_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        std::fs::write(store.path(), "hunter2\n").unwrap();
        let secret = store.load().unwrap().unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");
    }

    #[test]
    fn obtain_prefers_cache_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("hunter2").unwrap();

        // A prompt would fail here (no tty); the cache hit must short-circuit it.
        let (secret, source) = store.obtain().unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");
        assert_eq!(source, CredentialSource::Cached);
    }
}
