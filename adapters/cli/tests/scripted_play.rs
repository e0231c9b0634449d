use std::process::Command;

fn fog_forage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fog-forage"))
}

#[test]
fn scripted_moves_print_banner_and_status() {
    let output = fog_forage()
        .args(["--seed", "42", "--moves", "wasd"])
        .output()
        .expect("failed to run fog-forage");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Fog Forage."));
    assert!(stdout.contains("seed 42"));
    assert!(stdout.contains("energy"));
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        fog_forage()
            .args(["--seed", "9", "--world-size", "12", "--moves", "ddddssssaaaaww"])
            .output()
            .expect("failed to run fog-forage")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_world_size_is_reported() {
    let output = fog_forage()
        .args(["--world-size", "0", "--moves", "w"])
        .output()
        .expect("failed to run fog-forage");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("world size"), "unexpected stderr: {stderr}");
}
