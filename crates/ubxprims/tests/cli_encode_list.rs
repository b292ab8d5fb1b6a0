#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

fn ubxprims(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ubxprims"))
        .args(args)
        .output()
        .expect("ubxprims should run")
}

#[test]
fn encode_poll_prints_frame_hex() {
    let output = ubxprims(&["--format", "pretty", "encode", "NAV-POSLLH-POLL"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "B5 62 01 02 00 00 03 0A"
    );
}

#[test]
fn encode_raw_writes_frame_bytes() {
    let output = ubxprims(&[
        "--format",
        "raw",
        "encode",
        "AID-AOP-POLL-SV",
        "--set",
        "svid=5",
    ]);

    assert!(output.status.success());
    assert_eq!(
        output.stdout,
        vec![0xB5, 0x62, 0x0B, 0x33, 0x01, 0x00, 0x05, 0x44, 0x0B]
    );
}

#[test]
fn encode_json_reports_frame() {
    let output = ubxprims(&[
        "--format",
        "json",
        "encode",
        "log-retrieve",
        "--set",
        "entryCount=0x10",
    ]);

    assert!(output.status.success());
    let out: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("encode output should be json");
    assert_eq!(out["name"], "LOG-RETRIEVE");
    assert_eq!(out["payload_size"], 12);
    let frame = out["frame"].as_str().expect("frame hex");
    assert!(frame.starts_with("b56221090c00"));
    assert_eq!(&frame[12..28], "0000000010000000");
}

#[test]
fn encode_out_of_range_returns_60() {
    let output = ubxprims(&[
        "encode",
        "AID-AOP-POLL-SV",
        "--set",
        "svid=33",
    ]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
}

#[test]
fn encode_unknown_names_return_64() {
    assert_eq!(ubxprims(&["encode", "NAV-PVT"]).status.code(), Some(64));
    assert_eq!(
        ubxprims(&["encode", "MON-VER-POLL", "--set", "svid=1"])
            .status
            .code(),
        Some(64)
    );
}

#[test]
fn list_separates_output_and_polls() {
    let output = ubxprims(&["--format", "json", "list"]);
    assert!(output.status.success());
    let out: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<&str> = out["messages"]
        .as_array()
        .expect("messages array")
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert!(names.contains(&"NAV-SVINFO"));
    assert!(names.iter().all(|name| !name.ends_with("-POLL")));

    let polls = ubxprims(&["--format", "pretty", "list", "--poll"]);
    assert!(polls.status.success());
    let stdout = String::from_utf8_lossy(&polls.stdout);
    assert!(stdout.contains("0x0A/0x04 MON-VER-POLL size=0"));
    assert!(!stdout.contains("NAV-SVINFO"));
}

#[test]
fn version_prints_package_version() {
    let output = ubxprims(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("ubxprims {}", env!("CARGO_PKG_VERSION"))
    );
}
