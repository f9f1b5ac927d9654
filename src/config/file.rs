//! TOML configuration file loading
//!
//! Supports `~/.config/voicerig/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RigConfigFile {
    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsFileConfig,

    /// Asset download configuration
    #[serde(default)]
    pub assets: AssetsFileConfig,

    /// Pipeline source repository configuration
    #[serde(default)]
    pub pipeline: PipelineFileConfig,

    /// OS package installation
    #[serde(default)]
    pub packages: PackagesFileConfig,

    /// Terminal launch configuration
    #[serde(default)]
    pub launch: LaunchFileConfig,

    /// Container runtime configuration
    #[serde(default)]
    pub container: ContainerFileConfig,
}

/// Filesystem locations
#[derive(Debug, Default, Deserialize)]
pub struct PathsFileConfig {
    /// Cached sudo password file (default `~/.tempaccess`)
    pub credential: Option<String>,

    /// Voice asset directory (default `~/voice`)
    pub voice_dir: Option<String>,

    /// Privilege-priming helper script (default `/tmp/cache_sudo.sh`)
    pub privilege_helper: Option<String>,
}

/// Asset download configuration
#[derive(Debug, Default, Deserialize)]
pub struct AssetsFileConfig {
    /// Base URL the three asset files are fetched from
    pub base_url: Option<String>,
}

/// Pipeline source repository configuration
#[derive(Debug, Default, Deserialize)]
pub struct PipelineFileConfig {
    /// Git URL of the pipeline repository
    pub repo: Option<String>,

    /// Subdirectory of the repository holding the voice pipeline
    pub subdir: Option<String>,

    /// Audio capture script, relative to the voice directory
    pub capture_script: Option<String>,

    /// TTS client script, relative to the voice directory
    pub synthesis_script: Option<String>,

    /// TTS inference entrypoint, relative to the voice directory
    pub tts_entry: Option<String>,

    /// Transcription server entrypoint, relative to the voice directory
    pub transcription_entry: Option<String>,
}

/// OS package installation
#[derive(Debug, Default, Deserialize)]
pub struct PackagesFileConfig {
    /// Packages installed on first credential prompt
    pub names: Option<Vec<String>>,
}

/// Terminal launch configuration
#[derive(Debug, Default, Deserialize)]
pub struct LaunchFileConfig {
    /// Terminal emulator program
    pub terminal: Option<String>,
}

/// Container runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ContainerFileConfig {
    /// Container runtime command (e.g. "jetson-containers")
    pub runtime: Option<String>,

    /// Image auto-tag resolution helper (e.g. "autotag")
    pub autotag: Option<String>,

    /// Image tag for the TTS inference workload
    pub tts_image: Option<String>,

    /// Image tag for the transcription workload
    pub stt_image: Option<String>,

    /// Mount point of the voice directory inside containers
    pub mount_point: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `RigConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> RigConfigFile {
    let Some(path) = config_file_path() else {
        return RigConfigFile::default();
    };

    if !path.exists() {
        return RigConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                RigConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            RigConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voicerig/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voicerig").join("config.toml"))
}
