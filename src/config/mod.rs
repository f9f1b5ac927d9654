//! Configuration management for the voicerig bootstrapper

pub mod file;

use std::path::PathBuf;

use file::RigConfigFile;

/// Bootstrapper configuration
///
/// Every fixed path and constant of the pipeline is represented here with
/// its conventional default; each can be overridden via a `VOICERIG_*`
/// environment variable or the TOML config file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cached sudo password file
    pub credential_path: PathBuf,

    /// Directory holding the voice pipeline assets and scripts
    pub voice_dir: PathBuf,

    /// Privilege-priming helper script path
    pub privilege_helper: PathBuf,

    /// Asset download configuration
    pub assets: AssetConfig,

    /// Pipeline source repository configuration
    pub pipeline: PipelineConfig,

    /// OS packages installed on first credential prompt
    pub packages: PackagesConfig,

    /// Terminal launch configuration
    pub launch: LaunchConfig,

    /// Container runtime configuration
    pub container: ContainerConfig,
}

/// Asset download configuration
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Base URL the asset files are fetched from
    pub base_url: String,

    /// Filenames guaranteed to exist under the voice directory
    pub files: Vec<String>,
}

/// Pipeline source repository configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Git URL of the pipeline repository
    pub repo: String,

    /// Subdirectory of the repository holding the voice pipeline
    pub subdir: String,

    /// Audio capture script, relative to the voice directory
    pub capture_script: String,

    /// TTS client script, relative to the voice directory
    pub synthesis_script: String,

    /// TTS inference entrypoint, relative to the voice directory
    pub tts_entry: String,

    /// Transcription server entrypoint, relative to the voice directory
    pub transcription_entry: String,
}

/// OS package installation configuration
#[derive(Debug, Clone)]
pub struct PackagesConfig {
    /// Packages installed on first credential prompt
    pub names: Vec<String>,
}

/// Terminal launch configuration
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Terminal emulator program opened per workload
    pub terminal: String,

    /// Spawn workloads directly instead of in terminal windows
    pub no_terminal: bool,
}

/// Container runtime configuration
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Container runtime command
    pub runtime: String,

    /// Image auto-tag resolution helper
    pub autotag: String,

    /// Image tag for the TTS inference workload
    pub tts_image: String,

    /// Image tag for the transcription workload
    pub stt_image: String,

    /// Mount point of the voice directory inside containers
    pub mount_point: String,
}

/// Return the invoking user's home directory
///
/// Falls back to the current directory when the home cannot be resolved.
fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf())
}

impl Default for Config {
    fn default() -> Self {
        let home = home_dir();
        Self {
            credential_path: home.join(".tempaccess"),
            voice_dir: home.join("voice"),
            privilege_helper: PathBuf::from("/tmp/cache_sudo.sh"),
            assets: AssetConfig::default(),
            pipeline: PipelineConfig::default(),
            packages: PackagesConfig::default(),
            launch: LaunchConfig::default(),
            container: ContainerConfig::default(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://raw.githubusercontent.com/voicerig/pipeline/main/voice"
                .to_string(),
            files: vec![
                "glados_piper_medium.onnx".to_string(),
                "glados_piper_medium.onnx.json".to_string(),
                "inference.py".to_string(),
            ],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            repo: "https://github.com/voicerig/pipeline".to_string(),
            subdir: "voice".to_string(),
            capture_script: "whisper/audio_stream.py".to_string(),
            synthesis_script: "client.py".to_string(),
            tts_entry: "inference.py".to_string(),
            transcription_entry: "whisper/whisper_server.py".to_string(),
        }
    }
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            names: vec!["python3-dev".to_string(), "python3-venv".to_string()],
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            terminal: "gnome-terminal".to_string(),
            no_terminal: false,
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "jetson-containers".to_string(),
            autotag: "autotag".to_string(),
            tts_image: "piper-tts".to_string(),
            stt_image: "whisper".to_string(),
            mount_point: "/voice".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with defaults (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        Self::load_with_options(false)
    }

    /// Load configuration with an explicit headless-launch option
    #[must_use]
    pub fn load_with_options(no_terminal: bool) -> Self {
        let fc = file::load_config_file();
        Self::overlay(fc, no_terminal)
    }

    /// Apply env and file overrides on top of the built-in defaults
    fn overlay(fc: RigConfigFile, no_terminal: bool) -> Self {
        let default = Self::default();
        let RigConfigFile {
            paths,
            assets,
            pipeline,
            packages,
            launch,
            container,
        } = fc;

        let credential_path = std::env::var("VOICERIG_CREDENTIAL_PATH")
            .ok()
            .or(paths.credential)
            .map_or(default.credential_path, PathBuf::from);

        let voice_dir = std::env::var("VOICERIG_VOICE_DIR")
            .ok()
            .or(paths.voice_dir)
            .map_or(default.voice_dir, PathBuf::from);

        let privilege_helper = std::env::var("VOICERIG_PRIVILEGE_HELPER")
            .ok()
            .or(paths.privilege_helper)
            .map_or(default.privilege_helper, PathBuf::from);

        Self {
            credential_path,
            voice_dir,
            privilege_helper,
            assets: Self::assets_config(assets, default.assets),
            pipeline: Self::pipeline_config(pipeline, default.pipeline),
            packages: Self::packages_config(packages, default.packages),
            launch: LaunchConfig {
                terminal: std::env::var("VOICERIG_TERMINAL")
                    .ok()
                    .or(launch.terminal)
                    .unwrap_or(default.launch.terminal),
                no_terminal,
            },
            container: Self::container_config(container, default.container),
        }
    }

    fn assets_config(fc: file::AssetsFileConfig, default: AssetConfig) -> AssetConfig {
        let files = std::env::var("VOICERIG_ASSET_FILES")
            .ok()
            .map(|s| split_list(&s))
            .unwrap_or(default.files);

        AssetConfig {
            base_url: std::env::var("VOICERIG_ASSET_BASE_URL")
                .ok()
                .or(fc.base_url)
                .unwrap_or(default.base_url),
            files,
        }
    }

    fn pipeline_config(fc: file::PipelineFileConfig, default: PipelineConfig) -> PipelineConfig {
        PipelineConfig {
            repo: std::env::var("VOICERIG_PIPELINE_REPO")
                .ok()
                .or(fc.repo)
                .unwrap_or(default.repo),
            subdir: std::env::var("VOICERIG_PIPELINE_SUBDIR")
                .ok()
                .or(fc.subdir)
                .unwrap_or(default.subdir),
            capture_script: std::env::var("VOICERIG_CAPTURE_SCRIPT")
                .ok()
                .or(fc.capture_script)
                .unwrap_or(default.capture_script),
            synthesis_script: std::env::var("VOICERIG_SYNTHESIS_SCRIPT")
                .ok()
                .or(fc.synthesis_script)
                .unwrap_or(default.synthesis_script),
            tts_entry: std::env::var("VOICERIG_TTS_ENTRY")
                .ok()
                .or(fc.tts_entry)
                .unwrap_or(default.tts_entry),
            transcription_entry: std::env::var("VOICERIG_TRANSCRIPTION_ENTRY")
                .ok()
                .or(fc.transcription_entry)
                .unwrap_or(default.transcription_entry),
        }
    }

    fn packages_config(fc: file::PackagesFileConfig, default: PackagesConfig) -> PackagesConfig {
        let names = std::env::var("VOICERIG_PACKAGES")
            .ok()
            .map(|s| split_list(&s))
            .or(fc.names)
            .unwrap_or(default.names);

        PackagesConfig { names }
    }

    fn container_config(
        fc: file::ContainerFileConfig,
        default: ContainerConfig,
    ) -> ContainerConfig {
        ContainerConfig {
            runtime: std::env::var("VOICERIG_CONTAINER_RUNTIME")
                .ok()
                .or(fc.runtime)
                .unwrap_or(default.runtime),
            autotag: std::env::var("VOICERIG_AUTOTAG")
                .ok()
                .or(fc.autotag)
                .unwrap_or(default.autotag),
            tts_image: std::env::var("VOICERIG_TTS_IMAGE")
                .ok()
                .or(fc.tts_image)
                .unwrap_or(default.tts_image),
            stt_image: std::env::var("VOICERIG_STT_IMAGE")
                .ok()
                .or(fc.stt_image)
                .unwrap_or(default.stt_image),
            mount_point: std::env::var("VOICERIG_MOUNT_POINT")
                .ok()
                .or(fc.mount_point)
                .unwrap_or(default.mount_point),
        }
    }

    /// The two pipeline scripts whose presence decides the launch branch
    #[must_use]
    pub fn required_scripts(&self) -> Vec<String> {
        vec![
            self.pipeline.synthesis_script.clone(),
            self.pipeline.capture_script.clone(),
        ]
    }
}

/// Split a comma-separated list, trimming blanks
fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect()
}
