//! Sudo token priming for spawned workloads
//!
//! Sudo elevation tokens expire after a short window, so every launched
//! terminal re-primes the token before running its payload. A small helper
//! script at a fixed path does the priming, redirecting stdin from the
//! owner-only credential cache; the script itself carries no secret.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Writes and runs the sudo-priming helper script
#[derive(Debug, Clone)]
pub struct PrivilegeCache {
    helper_path: PathBuf,
    credential_path: PathBuf,
}

impl PrivilegeCache {
    /// Create a cache over the given helper and credential paths
    #[must_use]
    pub fn new(helper_path: impl Into<PathBuf>, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            helper_path: helper_path.into(),
            credential_path: credential_path.into(),
        }
    }

    /// Path of the helper script
    #[must_use]
    pub fn helper_path(&self) -> &Path {
        &self.helper_path
    }

    /// The helper script body
    #[must_use]
    pub fn render_script(&self) -> String {
        let credential = shell_words::quote(&self.credential_path.to_string_lossy()).into_owned();
        format!("#!/bin/bash\nsudo -S -v < {credential}\n")
    }

    /// Write the helper script, executable by owner only
    ///
    /// # Errors
    ///
    /// Returns error if the script cannot be written or its mode cannot be set.
    pub fn write_helper(&self) -> Result<()> {
        if let Some(parent) = self.helper_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.helper_path, self.render_script())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&self.helper_path, perms)?;
        }

        tracing::info!(path = %self.helper_path.display(), "privilege helper written");
        Ok(())
    }

    /// Run the helper once in the current process to pre-authenticate
    ///
    /// A wrong credential makes `sudo -v` fail; its stderr goes to the
    /// console and the failure is reported as an error for the caller to
    /// log. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns error if the helper cannot be spawned or exits non-zero.
    pub async fn prime(&self) -> Result<()> {
        let status = tokio::process::Command::new(&self.helper_path)
            .status()
            .await
            .map_err(|e| {
                Error::Privilege(format!(
                    "failed to run {}: {e}",
                    self.helper_path.display()
                ))
            })?;

        if !status.success() {
            return Err(Error::Privilege(format!(
                "sudo token priming exited with {status}"
            )));
        }

        tracing::debug!("sudo token primed");
        Ok(())
    }

    /// Shell command each launched workload runs first to refresh the token
    #[must_use]
    pub fn primer_command(&self) -> String {
        shell_words::quote(&self.helper_path.to_string_lossy()).into_owned()
    }
}
