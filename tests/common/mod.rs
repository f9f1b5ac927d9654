//! Shared test utilities

use std::path::Path;

use voicerig::Config;

/// Build a config rooted in a scratch directory, headless so no terminal
/// emulator or display server is needed
#[must_use]
pub fn test_config(root: &Path) -> Config {
    let mut config = Config {
        credential_path: root.join(".tempaccess"),
        voice_dir: root.join("voice"),
        privilege_helper: root.join("cache_sudo.sh"),
        ..Config::default()
    };
    config.launch.no_terminal = true;
    config
}

/// Place the two scripts whose presence selects the local-ready branch
pub fn place_required_scripts(config: &Config) {
    let whisper = config.voice_dir.join("whisper");
    std::fs::create_dir_all(&whisper).expect("failed to create voice dir");
    std::fs::write(config.voice_dir.join("client.py"), "").expect("failed to write client.py");
    std::fs::write(whisper.join("audio_stream.py"), "")
        .expect("failed to write audio_stream.py");
}
