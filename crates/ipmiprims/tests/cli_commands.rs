#![cfg(all(unix, feature = "cli"))]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/ipmicli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Fake `ipmitool`: appends each invocation's raw arguments to calls.log.
const FAKE_TOOL: &str = r#"#!/bin/sh
dir=$(dirname "$0")
while [ "$#" -gt 0 ] && [ "$1" != "raw" ]; do shift; done
shift
echo "$*" >> "$dir/calls.log"
case "$1 $2" in
  "0x06 0x01") echo " 20 81 02 03 51 bf 57 01 00 31 0b" ;;
  "0x00 0x01") echo " 21 00 40" ;;
  "0x00 0x08") ;;
  "0x00 0x09") echo " 01 05 80 48 00 00 00" ;;
  "0x06 0x46") echo " 61 64 6d 69 6e 00 00 00 00 00 00 00 00 00 00 00" ;;
  *) echo "Unable to send RAW command (channel=0x0 netfn=$1 lun=0x0 cmd=$2 rsp=0xc1): Invalid command" >&2; exit 1 ;;
esac
"#;

fn install_fake_tool(dir: &Path) -> PathBuf {
    let path = dir.join("ipmitool");
    std::fs::write(&path, FAKE_TOOL).expect("fake tool should be writable");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("fake tool should be executable");
    path
}

fn run_cli(tool: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ipmiprims"))
        .env_remove("IPMI_HOST")
        .env_remove("IPMI_PORT")
        .env_remove("IPMI_INTERFACE")
        .env("IPMIPRIMS_TOOL", tool)
        .env("IPMI_PASSWORD", "pw")
        .args(["--log-level", "error", "--format", "json", "--host", "bmc.test", "-U", "admin"])
        .args(args)
        .output()
        .expect("cli should run")
}

// One test function drives every command that executes the fake tool.
#[test]
fn commands_against_fake_tool() {
    let dir = unique_temp_dir("tool");
    let tool = install_fake_tool(&dir);

    let output = run_cli(&tool, &["device-id"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"ipmi_version\":\"1.5\""), "{stdout}");
    assert!(stdout.contains("\"manufacturer_id\":343"), "{stdout}");

    let output = run_cli(&tool, &["chassis", "status"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"power_on\":true"), "{stdout}");
    assert!(stdout.contains("\"restore_policy\":\"previous\""), "{stdout}");

    std::fs::write(dir.join("calls.log"), "").expect("calls log should reset");
    let output = run_cli(&tool, &["boot", "set", "pxe", "--persistent"]);
    assert!(output.status.success(), "{output:?}");
    let calls = std::fs::read_to_string(dir.join("calls.log")).expect("calls log");
    assert_eq!(
        calls.lines().collect::<Vec<_>>(),
        vec![
            "0x00 0x08 0x00 0x01",
            "0x00 0x08 0x04 0x01 0x01",
            "0x00 0x08 0x05 0x80 0x44 0x00 0x00 0x00",
            "0x00 0x08 0x00 0x02",
        ]
    );

    let output = run_cli(&tool, &["boot", "get"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"device\":\"disk\""), "{stdout}");
    assert!(stdout.contains("\"persistent\":true"), "{stdout}");

    let output = run_cli(&tool, &["user", "name", "2"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"username\":\"admin\""));

    let output = run_cli(&tool, &["raw", "0x06", "0xff"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid command (code=0xc1)"));

    let output = run_cli(&tool, &["boot", "set", "warp-drive"]);
    assert_eq!(output.status.code(), Some(64));

    let missing = dir.join("missing-tool");
    let output = run_cli(&missing, &["device-id"]);
    assert_eq!(output.status.code(), Some(3));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn options_prints_default_substitutions() {
    let output = Command::new(env!("CARGO_BIN_EXE_ipmiprims"))
        .env_remove("IPMI_PORT")
        .env_remove("IPMI_INTERFACE")
        .args(["--format", "raw", "--host", "10.0.0.5", "--user", "admin", "options"])
        .output()
        .expect("options should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "-H 10.0.0.5 -U admin -I lanplus -E"
    );
}

#[test]
fn missing_host_returns_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_ipmiprims"))
        .env_remove("IPMI_HOST")
        .arg("device-id")
        .output()
        .expect("device-id should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_ipmiprims"))
        .args(["version", "--extended"])
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
}
