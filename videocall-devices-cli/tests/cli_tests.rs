/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;
use videocall_devices_cli::cli_args::Opt;

const DEVICES: &str = r#"[
    { "kind": "audioinput", "deviceId": "abc", "label": "Headset", "groupId": "g1" },
    { "kind": "audioinput", "deviceId": "zoom", "label": "ZoomAudioDevice" },
    { "kind": "audiooutput", "deviceId": "spk", "label": "Speakers" },
    { "kind": "videoinput", "deviceId": "cam-1", "label": "Front" }
]"#;

struct Fixture {
    dir: TempDir,
    devices: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let devices = dir.path().join("devices.json");
        fs::write(&devices, DEVICES).unwrap();
        Self { dir, devices }
    }

    fn storage(&self) -> PathBuf {
        self.dir.path().join("selection.json")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

async fn run(args: &[&str]) -> anyhow::Result<String> {
    let opt = Opt::parse_from(std::iter::once("videocall-devices").chain(args.iter().copied()));
    let local = tokio::task::LocalSet::new();
    local.run_until(videocall_devices_cli::run(opt)).await
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[tokio::test]
async fn test_list_without_storage_activates_defaults() {
    let fixture = Fixture::new();
    let output = run(&["list", "--devices", arg(&fixture.devices)]).await.unwrap();

    assert!(output.contains("  * default  Same as System"));
    assert!(output.contains("    abc      Headset"));
    assert!(!output.contains("zoom"));
}

#[tokio::test]
async fn test_select_persists_across_runs() {
    let fixture = Fixture::new();
    let storage = fixture.storage();
    let common = ["--devices", arg(&fixture.devices), "--storage", arg(&storage)];

    let args: Vec<&str> = ["select", "--kind", "camera", "--id", "cam-1"]
        .into_iter()
        .chain(common)
        .collect();
    run(&args).await.unwrap();

    let args: Vec<&str> = ["list", "--format", "json"].into_iter().chain(common).collect();
    let output = run(&args).await.unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(snapshot["active_camera"], "cam-1");
    assert_eq!(snapshot["active_microphone"], "default");

    let args: Vec<&str> = ["reset", "--kind", "camera"].into_iter().chain(common).collect();
    assert_eq!(run(&args).await.unwrap(), "Reset camera");

    let args: Vec<&str> = ["list", "--format", "json"].into_iter().chain(common).collect();
    let output = run(&args).await.unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(snapshot["active_camera"], "default");
}

#[tokio::test]
async fn test_strict_select_of_unknown_device_fails() {
    let fixture = Fixture::new();
    let storage = fixture.storage();
    let result = run(&[
        "select",
        "--kind",
        "mic",
        "--id",
        "missing",
        "--strict",
        "--devices",
        arg(&fixture.devices),
        "--storage",
        arg(&storage),
    ])
    .await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("missing"), "{message}");
    assert!(!storage.exists());
}

#[tokio::test]
async fn test_lenient_select_of_unknown_device_is_not_persisted() {
    let fixture = Fixture::new();
    let config = fixture.path("config.json");
    fs::write(&config, r#"{ "strict_selection": false }"#).unwrap();
    let storage = fixture.storage();

    let output = run(&[
        "select",
        "--kind",
        "microphone",
        "--id",
        "missing",
        "--config",
        arg(&config),
        "--devices",
        arg(&fixture.devices),
        "--storage",
        arg(&storage),
        "--format",
        "json",
    ])
    .await
    .unwrap();

    let snapshot: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(snapshot["active_microphone"], "missing");
    assert!(!storage.exists());
}

#[tokio::test]
async fn test_malformed_devices_file_is_reported() {
    let fixture = Fixture::new();
    let devices = fixture.path("broken.json");
    fs::write(&devices, "not json").unwrap();

    let result = run(&["list", "--devices", arg(&devices)]).await;
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("parsing devices"), "{message}");
}

#[tokio::test]
async fn test_lenient_flag_overrides_strict_config() {
    let fixture = Fixture::new();
    let config = fixture.path("config.json");
    fs::write(&config, r#"{ "strict_selection": true }"#).unwrap();

    let output = run(&[
        "select",
        "--kind",
        "speaker",
        "--id",
        "missing",
        "--lenient",
        "--config",
        arg(&config),
        "--devices",
        arg(&fixture.devices),
        "--format",
        "json",
    ])
    .await
    .unwrap();

    let snapshot: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(snapshot["active_speaker"], "missing");
}
