//! Startup behaviour of the S3 connector: what reaches stdout and whether
//! the launcher runs.

use std::cell::RefCell;
use std::path::Path;

use chrono::Utc;
use rstest::rstest;
use serde_json::{json, Value};
use source_s3::{get_source, run, STARTUP_ERROR_MESSAGE};

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn write_catalog(dir: &Path, catalog: &Value) -> String {
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_vec(catalog).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn valid_catalog() -> Value {
    json!({
        "streams": [{
            "stream": {
                "name": "events",
                "json_schema": {"type": "object"},
                "supported_sync_modes": ["full_refresh", "incremental"]
            },
            "sync_mode": "incremental",
            "destination_sync_mode": "append"
        }]
    })
}

/// Parse `out` as exactly one startup error line and return it.
fn single_error_line(out: &[u8]) -> Value {
    let text = std::str::from_utf8(out).unwrap();
    assert!(text.ends_with('\n'), "line must be newline-terminated");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1, "expected one line, got: {text}");
    serde_json::from_str(lines[0]).unwrap()
}

fn assert_startup_error(line: &Value) {
    assert_eq!(line["type"], "TRACE");
    assert_eq!(line["trace"]["type"], "ERROR");
    assert_eq!(line["trace"]["error"]["message"], STARTUP_ERROR_MESSAGE);
    assert!(line["trace"]["error"]["stack_trace"].is_string());

    let keys: Vec<&String> = line.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2, "no extra top-level fields: {line}");
    let error = line["trace"]["error"].as_object().unwrap();
    assert_eq!(error.len(), 2, "only message and stack_trace: {line}");
    let trace = line["trace"].as_object().unwrap();
    assert_eq!(trace.len(), 3, "type, emitted_at, error: {line}");
}

#[rstest]
#[case::empty(&[])]
#[case::flags_without_command(&["--config", "secrets/config.json", "--catalog", "catalog.json"])]
#[case::unknown_command(&["sync", "--config", "c.json"])]
#[case::read_without_catalog(&["read", "--config", "c.json"])]
#[case::missing_catalog_file(&["read", "--config", "c.json", "--catalog", "/nonexistent/catalog.json"])]
fn failure_writes_one_error_line(#[case] raw: &[&str]) {
    let mut out = Vec::new();
    let source = get_source(&args(raw), &mut out);

    assert!(source.is_none());
    assert_startup_error(&single_error_line(&out));
}

#[test]
fn malformed_catalog_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, b"{\"streams\": [").unwrap();
    let path = path.to_string_lossy().into_owned();

    let mut out = Vec::new();
    let source = get_source(
        &args(&["read", "--config", "c.json", "--catalog", &path]),
        &mut out,
    );

    assert!(source.is_none());
    let line = single_error_line(&out);
    assert_startup_error(&line);
    let stack = line["trace"]["error"]["stack_trace"].as_str().unwrap();
    assert!(stack.contains("failed to parse"), "got: {stack}");
}

#[test]
fn duplicate_catalog_stream_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = valid_catalog();
    let stream = catalog["streams"][0].clone();
    catalog["streams"].as_array_mut().unwrap().push(stream);
    let path = write_catalog(dir.path(), &catalog);

    let mut out = Vec::new();
    let source = get_source(
        &args(&["read", "--config", "c.json", "--catalog", &path]),
        &mut out,
    );

    assert!(source.is_none());
    let line = single_error_line(&out);
    let stack = line["trace"]["error"]["stack_trace"].as_str().unwrap();
    assert!(stack.contains("configured more than once"), "got: {stack}");
}

#[test]
fn emitted_at_is_current_time() {
    let before = Utc::now().timestamp_millis();
    let mut out = Vec::new();
    get_source(&[], &mut out);
    let after = Utc::now().timestamp_millis();

    let emitted_at = single_error_line(&out)["trace"]["emitted_at"]
        .as_i64()
        .unwrap();
    assert!(emitted_at >= before - 5_000 && emitted_at <= after + 5_000);
}

#[rstest]
#[case::spec(&["spec"])]
#[case::check(&["check", "--config", "secrets/config.json"])]
#[case::discover(&["discover", "--config", "secrets/config.json"])]
fn success_writes_nothing(#[case] raw: &[&str]) {
    let mut out = Vec::new();
    let source = get_source(&args(raw), &mut out);

    let source = source.expect("source should be built");
    assert!(source.catalog().is_none());
    assert!(out.is_empty());
}

#[test]
fn read_with_catalog_loads_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog(dir.path(), &valid_catalog());

    let mut out = Vec::new();
    let source = get_source(
        &args(&["read", "--config", "c.json", "--catalog", &path]),
        &mut out,
    )
    .expect("source should be built");

    assert!(out.is_empty());
    let names: Vec<&str> = source.catalog().unwrap().stream_names().collect();
    assert_eq!(names, vec!["events"]);
}

#[test]
fn launcher_never_runs_after_failure() {
    let raw = args(&["--config", "secrets/config.json", "--catalog", "catalog.json"]);
    let calls = RefCell::new(0);
    let mut out = Vec::new();

    run(&raw, &mut out, |_, _| {
        *calls.borrow_mut() += 1;
        Ok(())
    })
    .unwrap();

    assert_eq!(*calls.borrow(), 0);
    assert_startup_error(&single_error_line(&out));
}

#[test]
fn launcher_runs_once_with_original_args() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog(dir.path(), &valid_catalog());
    let raw = args(&["read", "--config", "c.json", "--catalog", &path, "--debug"]);

    let seen = RefCell::new(Vec::new());
    let mut out = Vec::new();
    run(&raw, &mut out, |source, launch_args| {
        assert!(source.catalog().is_some());
        seen.borrow_mut().push(launch_args.to_vec());
        Ok(())
    })
    .unwrap();

    assert!(out.is_empty());
    assert_eq!(seen.into_inner(), vec![raw]);
}

#[test]
fn launcher_error_is_returned() {
    let mut out = Vec::new();
    let err = run(&args(&["spec"]), &mut out, |_, _| anyhow::bail!("launch failed"))
        .unwrap_err();
    assert_eq!(err.to_string(), "launch failed");
    assert!(out.is_empty());
}
