use std::process::{Command, Output};

fn run_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_intersection_sim"))
        .args(args)
        .env("RUST_LOG", "warn,intersection_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

fn seeded_run() -> Output {
    run_sim(&["--ticks", "1200", "--delta", "0.1", "--seed", "42", "--report-every", "0"])
}

/// Test that the headless simulation runs to completion
#[test]
fn test_headless_simulation_runs() {
    let output = seeded_run();

    assert!(
        output.status.success(),
        "Simulation failed to run. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Final State ==="));
}

/// Test that the end-of-run statistics are logged and vehicles were spawned
#[test]
fn test_simulation_statistics_logged() {
    let output = seeded_run();
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for label in [
        "Signal cycles completed:",
        "Total vehicles spawned:",
        "Total vehicles exited:",
        "Active vehicles:",
        "Throughput:",
    ] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }

    // Format: "[2026-01-01T00:00:00Z INFO  intersection_sim::simulation::world] Total vehicles spawned: 61"
    let spawned_line = stderr
        .lines()
        .find(|line| line.contains("Total vehicles spawned:"))
        .expect("Could not find 'Total vehicles spawned' line");
    let spawned: u32 = spawned_line
        .split("Total vehicles spawned:")
        .nth(1)
        .and_then(|s| s.trim().parse().ok())
        .expect("Could not parse spawned count");

    assert!(spawned > 0, "No vehicles were spawned during simulation");
}

/// Test that an invalid signal timing is rejected before the run starts
#[test]
fn test_invalid_timing_is_rejected() {
    let output = run_sim(&["--ticks", "10", "--green", "0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("configuration error"),
        "Unexpected stderr: {}",
        stderr
    );
}
