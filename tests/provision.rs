//! Provisioning integration tests
//!
//! Exercises asset downloads and the full provisioning phase against a
//! local HTTP mock; nothing touches the real network.

use httpmock::prelude::*;
use voicerig::{AssetProvisioner, Bootstrap};

mod common;

#[tokio::test]
async fn missing_assets_are_downloaded_exactly_once() {
    let server = MockServer::start();
    let root = tempfile::tempdir().expect("tempdir");
    let voice_dir = root.path().join("voice");

    let onnx = server.mock(|when, then| {
        when.method(GET).path("/voice/glados_piper_medium.onnx");
        then.status(200).body("onnx-bytes");
    });
    let meta = server.mock(|when, then| {
        when.method(GET).path("/voice/glados_piper_medium.onnx.json");
        then.status(200).body("{}");
    });
    let script = server.mock(|when, then| {
        when.method(GET).path("/voice/inference.py");
        then.status(200).body("print('ready')");
    });

    let files = vec![
        "glados_piper_medium.onnx".to_string(),
        "glados_piper_medium.onnx.json".to_string(),
        "inference.py".to_string(),
    ];
    let provisioner = AssetProvisioner::new(
        &voice_dir,
        format!("{}/voice", server.base_url()),
        &files,
    );

    let fetched = provisioner.ensure_all().await.expect("first run");
    assert_eq!(fetched, 3);
    assert_eq!(
        std::fs::read_to_string(voice_dir.join("inference.py")).expect("inference.py"),
        "print('ready')"
    );
    assert_eq!(
        std::fs::read_to_string(voice_dir.join("glados_piper_medium.onnx")).expect("onnx"),
        "onnx-bytes"
    );

    // Everything present now: the second run downloads nothing
    let fetched = provisioner.ensure_all().await.expect("second run");
    assert_eq!(fetched, 0);

    onnx.assert_calls(1);
    meta.assert_calls(1);
    script.assert_calls(1);
}

#[tokio::test]
async fn failed_download_leaves_no_file_and_the_rest_proceed() {
    let server = MockServer::start();
    let root = tempfile::tempdir().expect("tempdir");
    let voice_dir = root.path().join("voice");

    server.mock(|when, then| {
        when.method(GET).path("/voice/broken.onnx");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/voice/inference.py");
        then.status(200).body("print('ready')");
    });

    let files = vec!["broken.onnx".to_string(), "inference.py".to_string()];
    let provisioner =
        AssetProvisioner::new(&voice_dir, format!("{}/voice", server.base_url()), &files);

    let fetched = provisioner.ensure_all().await.expect("run");
    assert_eq!(fetched, 1);

    assert!(!voice_dir.join("broken.onnx").exists());
    assert!(!voice_dir.join("broken.onnx.part").exists());
    assert!(voice_dir.join("inference.py").is_file());
}

#[tokio::test]
async fn provision_with_cached_credential_skips_prompt_and_fetches_assets() {
    let server = MockServer::start();
    let root = tempfile::tempdir().expect("tempdir");

    let mut config = common::test_config(root.path());
    config.assets.base_url = format!("{}/voice", server.base_url());

    // Pre-cached credential: no prompt, no package install attempt
    std::fs::write(&config.credential_path, "hunter2\n").expect("write credential");

    for file in &config.assets.files {
        let path = format!("/voice/{file}");
        server.mock(move |when, then| {
            when.method(GET).path(path);
            then.status(200).body("asset-bytes");
        });
    }

    let bootstrap = Bootstrap::new(config.clone());
    bootstrap.provision().await.expect("provision");

    for file in &config.assets.files {
        assert!(config.voice_dir.join(file).is_file(), "missing {file}");
    }

    // The privilege helper exists and references the credential cache
    // without embedding the password itself
    let helper = std::fs::read_to_string(&config.privilege_helper).expect("helper");
    assert!(helper.contains(&config.credential_path.display().to_string()));
    assert!(!helper.contains("hunter2"));

    assert!(bootstrap.status().credential_cached);
}
