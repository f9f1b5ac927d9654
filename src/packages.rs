//! OS package installation for the pipeline's Python tooling
//!
//! Runs only when the credential was freshly prompted: a package index
//! update followed by installation of the Python dev headers and the
//! virtual-env tool. Each command is elevated via `sudo -S` with the
//! credential written to stdin.

use std::process::Stdio;

use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;

use crate::{Error, Result};

/// Installs a fixed set of OS packages via the system package manager
#[derive(Debug, Clone)]
pub struct PackageInstaller {
    packages: Vec<String>,
}

impl PackageInstaller {
    /// Create an installer for the given package names
    #[must_use]
    pub fn new(packages: Vec<String>) -> Self {
        Self { packages }
    }

    /// The `apt-get` invocations this installer performs, in order
    #[must_use]
    pub fn commands(&self) -> Vec<Vec<String>> {
        let mut install = vec![
            "apt-get".to_string(),
            "install".to_string(),
            "-y".to_string(),
        ];
        install.extend(self.packages.iter().cloned());

        vec![
            vec!["apt-get".to_string(), "update".to_string()],
            install,
        ]
    }

    /// Update the package index and install all configured packages
    ///
    /// Stops at the first command that fails; the caller decides whether
    /// that aborts the run (it does not, per the propagation policy).
    ///
    /// # Errors
    ///
    /// Returns error if a command cannot be spawned or exits non-zero.
    pub async fn install_all(&self, credential: &SecretString) -> Result<()> {
        for argv in self.commands() {
            run_elevated(&argv, credential).await?;
        }

        tracing::info!(packages = ?self.packages, "system packages installed");
        Ok(())
    }
}

/// Run a command under `sudo -S`, feeding the credential on stdin
async fn run_elevated(argv: &[String], credential: &SecretString) -> Result<()> {
    let mut child = tokio::process::Command::new("sudo")
        .arg("-S")
        .args(argv)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Install(format!("failed to run sudo {}: {e}", argv.join(" "))))?;

    if let Some(mut stdin) = child.stdin.take() {
        let line = format!("{}\n", credential.expose_secret());
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Install(format!("failed to feed credential: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| Error::Install(format!("sudo {} failed: {e}", argv.join(" "))))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Install(format!(
            "{} exited with code {}: {}",
            argv.join(" "),
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    tracing::debug!(command = %argv.join(" "), "package command completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_update_then_install() {
        let installer = PackageInstaller::new(vec![
            "python3-dev".to_string(),
            "python3-venv".to_string(),
        ]);

        let commands = installer.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], vec!["apt-get", "update"]);
        assert_eq!(
            commands[1],
            vec!["apt-get", "install", "-y", "python3-dev", "python3-venv"]
        );
    }

    #[test]
    fn install_command_carries_every_package() {
        let installer = PackageInstaller::new(vec!["jq".to_string()]);
        let commands = installer.commands();
        assert_eq!(commands[1], vec!["apt-get", "install", "-y", "jq"]);
    }
}
