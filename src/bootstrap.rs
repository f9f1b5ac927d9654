//! Bootstrap orchestration
//!
//! Runs the provisioning phases in order (credential, packages,
//! privilege cache, assets), selects the launch mode, and starts the
//! four pipeline workloads. Phase failures are logged and later phases
//! still run; a run only aborts when nothing useful can follow: the
//! credential prompt was cancelled, the voice directory cannot be
//! created, or not a single workload could be spawned.

use crate::config::Config;
use crate::credential::{CredentialSource, CredentialStore};
use crate::launcher::{Supervisor, WorkloadHandle};
use crate::packages::PackageInstaller;
use crate::privilege::PrivilegeCache;
use crate::provision::AssetProvisioner;
use crate::selector::{self, LaunchMode};
use crate::workload::{self, Workload};
use crate::{Error, Result};

/// What a launch would do, without doing it
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub mode: LaunchMode,
    /// Required scripts currently absent from the voice directory
    pub missing_scripts: Vec<String>,
    pub workloads: Vec<Workload>,
}

/// Snapshot of the host against the configured pipeline
#[derive(Debug, Clone)]
pub struct RigStatus {
    pub credential_cached: bool,
    pub mode: LaunchMode,
    pub missing_scripts: Vec<String>,
    pub missing_assets: Vec<String>,
    /// Configured external tools not found on `PATH`
    pub missing_tools: Vec<String>,
}

/// Drives the full provision-then-launch sequence
#[derive(Debug, Clone)]
pub struct Bootstrap {
    config: Config,
}

impl Bootstrap {
    /// Create a bootstrapper over the loaded configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration this bootstrapper runs with
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Provision the host, then launch the pipeline
    ///
    /// Workload handles are dropped after spawning: the pipeline keeps
    /// running on its own once this returns.
    ///
    /// # Errors
    ///
    /// Returns error if provisioning or launching hits a fatal failure.
    pub async fn run(&self) -> Result<()> {
        self.provision().await?;
        let handles = self.launch().await?;
        tracing::info!(workloads = handles.len(), "voice rig is up");
        Ok(())
    }

    /// Run the provisioning phases
    ///
    /// Package installation only happens when the credential was freshly
    /// prompted; a cached credential means the host was provisioned
    /// before. Package and privilege failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns error if the credential prompt is aborted or the voice
    /// directory cannot be created.
    pub async fn provision(&self) -> Result<()> {
        let store = CredentialStore::new(&self.config.credential_path);
        let (credential, source) = store.obtain()?;
        tracing::info!(%source, "credential ready");

        if source == CredentialSource::Prompted {
            let installer = PackageInstaller::new(self.config.packages.names.clone());
            if let Err(e) = installer.install_all(&credential).await {
                tracing::warn!(error = %e, "package installation failed, continuing");
            }
        } else {
            tracing::debug!("credential cached, skipping package installation");
        }

        let privilege = self.privilege_cache();
        if let Err(e) = privilege.write_helper() {
            tracing::warn!(error = %e, "privilege helper could not be written, continuing");
        } else if let Err(e) = privilege.prime().await {
            tracing::warn!(error = %e, "privilege cache priming failed, continuing");
        }

        let fetched = AssetProvisioner::from_config(&self.config).ensure_all().await?;
        tracing::info!(fetched, "assets provisioned");
        Ok(())
    }

    /// Select the launch mode and start the four workloads
    ///
    /// A failed pipeline fetch is logged and the launch still proceeds,
    /// matching the provisioning policy: whatever is present gets to run.
    ///
    /// # Errors
    ///
    /// Returns error if the voice directory cannot be resolved or no
    /// workload could be spawned at all.
    pub async fn launch(&self) -> Result<Vec<WorkloadHandle>> {
        let required = self.config.required_scripts();
        let mode = selector::detect(&self.config.voice_dir, &required);
        tracing::info!(%mode, "launch mode selected");

        if mode == LaunchMode::NeedsFetch {
            if let Err(e) = checkout_into(&self.config).await {
                tracing::warn!(error = %e, "pipeline fetch failed, launching anyway");
            }
        }

        for tool in self.missing_tools() {
            tracing::warn!(tool = %tool, "required tool not found on PATH");
        }

        let workloads = workload::plan(&self.config)?;
        let supervisor = Supervisor::new(&self.config, self.privilege_cache().primer_command());
        let handles = supervisor.launch_all(&workloads);

        if handles.is_empty() {
            return Err(Error::Launch("no workload could be spawned".to_string()));
        }
        Ok(handles)
    }

    /// Describe what a launch would do right now
    ///
    /// # Errors
    ///
    /// Returns error if the voice directory cannot be resolved.
    pub fn plan(&self) -> Result<LaunchPlan> {
        let required = self.config.required_scripts();
        Ok(LaunchPlan {
            mode: selector::detect(&self.config.voice_dir, &required),
            missing_scripts: selector::missing_scripts(&self.config.voice_dir, &required),
            workloads: workload::plan(&self.config)?,
        })
    }

    /// Inspect the host without changing it
    #[must_use]
    pub fn status(&self) -> RigStatus {
        let required = self.config.required_scripts();
        let missing_assets = self
            .config
            .assets
            .files
            .iter()
            .filter(|f| !self.config.voice_dir.join(f).is_file())
            .cloned()
            .collect();

        RigStatus {
            credential_cached: CredentialStore::new(&self.config.credential_path).is_cached(),
            mode: selector::detect(&self.config.voice_dir, &required),
            missing_scripts: selector::missing_scripts(&self.config.voice_dir, &required),
            missing_assets,
            missing_tools: self.missing_tools(),
        }
    }

    fn privilege_cache(&self) -> PrivilegeCache {
        PrivilegeCache::new(&self.config.privilege_helper, &self.config.credential_path)
    }

    /// Configured external tools not resolvable on `PATH`
    fn missing_tools(&self) -> Vec<String> {
        let mut tools = Vec::new();
        if !self.config.launch.no_terminal {
            tools.push(self.config.launch.terminal.clone());
        }
        tools.push(self.config.container.runtime.clone());
        tools.push(self.config.container.autotag.clone());
        tools.push("git".to_string());
        tools.push("python3".to_string());
        tools.retain(|tool| which::which(tool).is_err());
        tools
    }
}

/// Fetch the pipeline subtree into the configured voice directory
async fn checkout_into(config: &Config) -> Result<usize> {
    crate::checkout::fetch_pipeline(
        &config.pipeline.repo,
        &config.pipeline.subdir,
        &config.voice_dir,
    )
    .await
}
