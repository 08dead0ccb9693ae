use std::process::Command;

fn skirmish() -> Command {
    Command::new(env!("CARGO_BIN_EXE_skirmish"))
}

#[test]
fn help_lists_session_flags() {
    let output = skirmish()
        .arg("--help")
        .output()
        .expect("failed to launch skirmish");
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--config",
        "--ticks",
        "--tick-rate",
        "--clients",
        "--enemies",
        "--seed",
        "--drop-rate",
    ] {
        assert!(help.contains(flag), "help should mention {flag}:\n{help}");
    }
}

#[test]
fn short_session_prints_summary() {
    let output = skirmish()
        .args(["--ticks", "40", "--clients", "2", "--enemies", "1", "--seed", "5"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch skirmish");
    assert!(output.status.success());

    let summary = String::from_utf8_lossy(&output.stdout);
    assert!(summary.contains("ticks: 40"), "{summary}");
    assert!(summary.contains("character 1 (client 2)"), "{summary}");
    assert!(summary.contains("enemy 0"), "{summary}");
}

#[test]
fn out_of_range_drop_rate_is_rejected() {
    let output = skirmish()
        .args(["--ticks", "1", "--drop-rate", "1.5"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch skirmish");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--drop-rate"));
}
