//! Launch mode selection
//!
//! Decides between launching the locally present pipeline scripts and
//! fetching them first, based purely on which required scripts exist
//! under the voice directory.

use std::path::Path;

/// How the pipeline will be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Every required script is present under the voice directory
    LocalReady,
    /// At least one required script is missing; fetch before launch
    NeedsFetch,
}

impl std::fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalReady => write!(f, "local-ready"),
            Self::NeedsFetch => write!(f, "needs-fetch"),
        }
    }
}

/// Detect the launch mode for a voice directory
///
/// `required` paths are relative to `voice_dir`. An empty requirement
/// list is trivially satisfied.
#[must_use]
pub fn detect(voice_dir: &Path, required: &[String]) -> LaunchMode {
    if missing_scripts(voice_dir, required).is_empty() {
        LaunchMode::LocalReady
    } else {
        LaunchMode::NeedsFetch
    }
}

/// Required scripts not present under `voice_dir`
#[must_use]
pub fn missing_scripts(voice_dir: &Path, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|script| !voice_dir.join(script).is_file())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        vec!["client.py".to_string(), "whisper/audio_stream.py".to_string()]
    }

    #[test]
    fn all_present_is_local_ready() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("client.py"), "").unwrap();
        std::fs::create_dir(dir.path().join("whisper")).unwrap();
        std::fs::write(dir.path().join("whisper/audio_stream.py"), "").unwrap();

        assert_eq!(detect(dir.path(), &required()), LaunchMode::LocalReady);
        assert!(missing_scripts(dir.path(), &required()).is_empty());
    }

    #[test]
    fn one_missing_needs_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("client.py"), "").unwrap();

        assert_eq!(detect(dir.path(), &required()), LaunchMode::NeedsFetch);
        assert_eq!(
            missing_scripts(dir.path(), &required()),
            vec!["whisper/audio_stream.py".to_string()]
        );
    }

    #[test]
    fn absent_directory_needs_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let voice = dir.path().join("voice");

        assert_eq!(detect(&voice, &required()), LaunchMode::NeedsFetch);
        assert_eq!(missing_scripts(&voice, &required()).len(), 2);
    }

    #[test]
    fn directory_with_script_name_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("client.py")).unwrap();

        let required = vec!["client.py".to_string()];
        assert_eq!(detect(dir.path(), &required), LaunchMode::NeedsFetch);
    }

    #[test]
    fn no_requirements_is_local_ready() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect(dir.path(), &[]), LaunchMode::LocalReady);
    }
}
