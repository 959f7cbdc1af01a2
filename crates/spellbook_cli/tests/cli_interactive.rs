use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("spellbook-{nanos}-{file_name}"))
}

fn run_interactive(file_name: &str, input: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_spellbook_cli");
    let store_path = temp_path(file_name);
    let config_path = temp_path("interactive-no-config.json");

    let mut child = Command::new(exe)
        .env("SPELLBOOK_STORE_PATH", &store_path)
        .env("SPELLBOOK_CONFIG_PATH", &config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");

    std::fs::remove_file(&store_path).ok();
    output
}

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("interactive-help.json", "help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_add_then_list_round_trip() {
    let output = run_interactive(
        "interactive-add-list.json",
        "add \"Wingardium Leviosa\"\nlist\nexit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Wingardium Leviosa"));
    assert!(stdout.contains("Total tasks: 1"));
}

#[test]
fn interactive_invalid_command_prints_error_and_continues() {
    let output = run_interactive("interactive-invalid.json", "abracadabra\nstats\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR:"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total tasks: 0"));
}

#[test]
fn interactive_unterminated_quote_is_reported() {
    let output = run_interactive("interactive-quote.json", "add \"Lumos\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated quote"));
}
