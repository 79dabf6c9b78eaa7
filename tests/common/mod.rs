#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_asweep") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "asweep.exe" } else { "asweep" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve asweep binary path for integration test"),
    }
}

/// Run the binary with `args` and `envs`, isolated from the caller's
/// settings file and `ASW_*` overrides. `home` stands in for `$HOME`.
pub fn run_cli_case(
    case_name: &str,
    home: &Path,
    args: &[&str],
    envs: &[(&str, &str)],
) -> CmdResult {
    let root = std::env::temp_dir().join("asweep-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home)
        .env_remove("ASW_CONFIG")
        .env_remove("ASW_JF_BIN")
        .env_remove("ASW_THREADS")
        .env_remove("ASW_LOG_DIR")
        .env("RUST_BACKTRACE", "1");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("execute asweep command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Scripted stand-in for the JFrog CLI.
///
/// Every invocation appends its arguments to `calls.log`; `rt search`
/// prints `search.json`; `rt del` fails for paths containing `fail`.
#[cfg(unix)]
pub fn install_fake_jf(dir: &Path, search_output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = r#"#!/bin/sh
here="$(dirname "$0")"
echo "$*" >> "$here/calls.log"
case "$1 $2" in
  "config show") exit 0 ;;
  "config add"|"config use") exit 0 ;;
  "rt search") cat "$here/search.json"; exit 0 ;;
  "rt del")
    case "$3" in
      *fail*) echo "404 not found: $3" >&2; exit 1 ;;
    esac
    exit 0 ;;
esac
echo "unexpected jf call: $*" >&2
exit 2
"#;
    let bin = dir.join("jf");
    fs::write(&bin, script).expect("write fake jf");
    fs::write(dir.join("search.json"), search_output).expect("write search output");
    fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).expect("chmod fake jf");
    bin
}

/// Lines the fake `jf` recorded, in call order.
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Contents of the single run log written into `log_dir`.
pub fn read_run_log(log_dir: &Path) -> String {
    let entry = fs::read_dir(log_dir)
        .expect("read log dir")
        .filter_map(Result::ok)
        .find(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("clean_old_artifacts_")
        })
        .expect("run log file present");
    fs::read_to_string(entry.path()).expect("read run log")
}
