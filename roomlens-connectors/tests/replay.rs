//! Integration tests for replaying recordings through a mapping pipeline.

use std::fs;

use roomlens_connectors::{load_recording_file, ReplayError};
use roomlens_core::{MappingPipeline, MappingSpec};
use serde_json::json;
use tempfile::tempdir;

fn pipeline() -> MappingPipeline {
    let spec = MappingSpec::from_json_str(
        r#"{"sensors": {"mic": {"enabled": true, "features": {
            "rms": {"map_to": {"axis": "grain_density", "range": [0, 10]}}
        }}}}"#,
    )
    .unwrap();
    MappingPipeline::new(spec).unwrap()
}

#[test]
fn recording_replays_through_pipeline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("walkthrough.ndjson");
    fs::write(
        &path,
        "{\"t\": 0, \"mic_rms\": 0.1}\n{\"t\": 50, \"mic_rms\": 0.5}\n\n{\"t\": 100, \"mic_rms\": 1.0}\n",
    )
    .unwrap();

    let recording = load_recording_file(&path).unwrap();
    let pipeline = pipeline();
    let payloads: Vec<_> = pipeline
        .iter_process(recording.frames(false))
        .map(|p| p.unwrap())
        .collect();

    assert_eq!(payloads.len(), 3);
    assert_eq!(payloads[1].t, Some(json!(50)));
    assert_eq!(payloads[2].axes["grain_density"], 10.0);
}

#[test]
fn looped_replay_can_be_capped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.ndjson");
    fs::write(&path, "{\"t\": 1, \"mic_rms\": 0.2}\n{\"t\": 2, \"mic_rms\": 0.4}\n").unwrap();

    let recording = load_recording_file(&path).unwrap();
    let pipeline = pipeline();
    let stamps: Vec<_> = pipeline
        .iter_process(recording.frames(true).take(5))
        .map(|p| p.unwrap().t.unwrap())
        .collect();
    assert_eq!(stamps, vec![json!(1), json!(2), json!(1), json!(2), json!(1)]);
}

#[test]
fn bad_line_reports_its_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ndjson");
    fs::write(&path, "{\"mic_rms\": 0.2}\n\"just a string\"\n").unwrap();

    let err = load_recording_file(&path).unwrap_err();
    assert!(matches!(err, ReplayError::Frame { line: 2, .. }));
}

#[test]
fn missing_or_empty_recordings_fail() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_recording_file(dir.path().join("absent.ndjson")),
        Err(ReplayError::Io(_))
    ));

    let empty = dir.path().join("empty.ndjson");
    fs::write(&empty, "\n\n").unwrap();
    assert!(matches!(load_recording_file(&empty), Err(ReplayError::Empty)));
}
