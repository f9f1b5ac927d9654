//! Workload planning
//!
//! Builds the fixed set of four pipeline workloads: audio capture,
//! speech synthesis, and the two container-wrapped inference servers.
//! Every branch of the launcher runs exactly this set; only the paths
//! come from configuration.

use std::path::{Path, PathBuf};

use crate::config::{Config, ContainerConfig};
use crate::{Error, Result};

/// The four logical roles of the voice pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadRole {
    /// Text-to-speech inference server (container-wrapped)
    TtsInference,
    /// Speech-to-text inference server (container-wrapped)
    TranscriptionInference,
    /// Microphone capture and streaming
    Capture,
    /// Assistant client driving synthesis
    Synthesis,
}

impl WorkloadRole {
    /// Every role, in launch order (inference servers before clients)
    pub const ALL: [Self; 4] = [
        Self::TtsInference,
        Self::TranscriptionInference,
        Self::Capture,
        Self::Synthesis,
    ];

    /// Short stable name used in logs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TtsInference => "tts-inference",
            Self::TranscriptionInference => "transcription-inference",
            Self::Capture => "capture",
            Self::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for WorkloadRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One planned workload: a shell command and the directory to run it in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub role: WorkloadRole,
    /// Shell command line executed inside the terminal session
    pub command: String,
    /// Working directory the session changes into first
    pub workdir: PathBuf,
}

/// Plan the four workloads for the configured voice directory
///
/// The voice directory is resolved to an absolute path once and used for
/// both the working directory and the container volume mounts, so every
/// workload sees the same tree regardless of where the tool was invoked.
///
/// # Errors
///
/// Returns error if the voice directory path is relative and cannot be
/// resolved against the filesystem.
pub fn plan(config: &Config) -> Result<Vec<Workload>> {
    let host_dir = resolve_voice_dir(&config.voice_dir)?;
    Ok(WorkloadRole::ALL
        .iter()
        .map(|role| build(*role, config, &host_dir))
        .collect())
}

/// Resolve the voice directory to an absolute path
///
/// Canonicalizes when the directory exists; otherwise an already-absolute
/// configured path is taken as-is (planning may run before provisioning).
fn resolve_voice_dir(voice_dir: &Path) -> Result<PathBuf> {
    match voice_dir.canonicalize() {
        Ok(abs) => Ok(abs),
        Err(_) if voice_dir.is_absolute() => Ok(voice_dir.to_path_buf()),
        Err(e) => Err(Error::Config(format!(
            "voice directory {} cannot be resolved to an absolute path: {e}",
            voice_dir.display()
        ))),
    }
}

fn build(role: WorkloadRole, config: &Config, host_dir: &Path) -> Workload {
    let command = match role {
        WorkloadRole::Capture => python_command(&config.pipeline.capture_script),
        WorkloadRole::Synthesis => python_command(&config.pipeline.synthesis_script),
        WorkloadRole::TtsInference => container_command(
            &config.container,
            host_dir,
            &config.container.tts_image,
            &config.pipeline.tts_entry,
        ),
        WorkloadRole::TranscriptionInference => container_command(
            &config.container,
            host_dir,
            &config.container.stt_image,
            &config.pipeline.transcription_entry,
        ),
    };

    Workload {
        role,
        command,
        workdir: host_dir.to_path_buf(),
    }
}

fn python_command(script: &str) -> String {
    format!("python3 {}", shell_words::quote(script))
}

/// Build a container-runtime invocation that mounts the voice directory
/// and resolves the image tag through the auto-tag helper
fn container_command(
    container: &ContainerConfig,
    host_dir: &Path,
    image: &str,
    entry: &str,
) -> String {
    let host = shell_words::quote(&host_dir.to_string_lossy()).into_owned();
    format!(
        "{runtime} run -v {host}:{mount} $({autotag} {image}) python3 {mount}/{entry}",
        runtime = container.runtime,
        mount = container.mount_point,
        autotag = container.autotag,
    )
}
