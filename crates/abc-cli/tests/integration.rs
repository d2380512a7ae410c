//! Integration tests for abc-cli.
//!
//! Each test runs the built binary and checks what it prints.

use std::process::{Command, Output};

/// Helper to get the path to the `abc` binary built by cargo.
fn abc_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_abc"))
}

fn run(args: &[&str]) -> Output {
    abc_bin()
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run abc {args:?}: {e}"))
}

fn stdout_of(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "abc {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Numeric columns of the data rows, skipping headers.
fn numeric_rows(stdout: &str) -> Vec<Vec<f32>> {
    stdout
        .lines()
        .filter_map(|line| {
            let row: Option<Vec<f32>> = line.split_whitespace().map(|t| t.parse().ok()).collect();
            row.filter(|r| !r.is_empty())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// abc curves
// ---------------------------------------------------------------------------

#[test]
fn curves_lists_every_distribution() {
    let stdout = stdout_of(&["curves"]);
    for name in ["linear", "cubic_out", "sinusoidal_in_out", "circular_out"] {
        assert!(stdout.contains(name), "missing {name}");
    }
    // Header plus 22 curves.
    assert_eq!(stdout.lines().count(), 23);
}

#[test]
fn curves_single_curve_spans_zero_to_one() {
    let stdout = stdout_of(&["curves", "--curve", "linear", "--points", "5"]);
    let row = stdout
        .lines()
        .find(|l| l.contains("linear"))
        .expect("linear row");
    let values: Vec<f32> = row
        .split_whitespace()
        .skip(2)
        .map(|t| t.parse().unwrap())
        .collect();
    assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn curves_rejects_unknown_name() {
    let output = run(&["curves", "--curve", "wobbly"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// abc harmonics
// ---------------------------------------------------------------------------

#[test]
fn harmonics_first_order_front() {
    let stdout = stdout_of(&["harmonics", "--order", "1"]);
    let rows = numeric_rows(&stdout);
    // acn, l, m, value: W Y Z X at the front, X carrying the Condon-Shortley sign.
    let values: Vec<f32> = rows.iter().map(|r| r[3]).collect();
    assert_eq!(values.len(), 4);
    assert!((values[0] - 1.0).abs() < 1e-5);
    assert!(values[1].abs() < 1e-5);
    assert!(values[2].abs() < 1e-5);
    assert!((values[3] + 1.0).abs() < 1e-5);
}

#[test]
fn harmonics_planar_left() {
    let stdout = stdout_of(&["harmonics", "--planar", "--order", "2", "--azimuth", "90"]);
    let rows = numeric_rows(&stdout);
    assert_eq!(rows.len(), 1, "only the omni row has no part label");
    assert!(stdout.contains("sin"));
    let sin1 = stdout
        .lines()
        .filter(|l| l.contains("sin"))
        .map(|l| l.split_whitespace().last().unwrap().parse::<f32>().unwrap())
        .next()
        .unwrap();
    assert!((sin1 - 1.0).abs() < 1e-5);
}

#[test]
fn harmonics_rejects_excessive_order() {
    let output = run(&["harmonics", "--order", "17"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("17"), "{stderr}");
}

// ---------------------------------------------------------------------------
// abc gains
// ---------------------------------------------------------------------------

#[test]
fn gains_quad_front_source() {
    let stdout = stdout_of(&["gains", "--rig", "quad", "--azimuth", "0"]);
    let rows = numeric_rows(&stdout);
    // spk, angle, gain
    let gains: Vec<f32> = rows.iter().filter(|r| r.len() == 3).map(|r| r[2]).collect();
    assert_eq!(gains.len(), 4);
    assert!((gains[0] - 0.75).abs() < 1e-4, "{gains:?}");
    assert!((gains[1] - 0.25).abs() < 1e-4, "{gains:?}");
    assert!((gains[2] + 0.25).abs() < 1e-4, "{gains:?}");
    assert!((gains[3] - 0.25).abs() < 1e-4, "{gains:?}");
}

#[test]
fn gains_itu_source_on_centre_speaker() {
    let stdout = stdout_of(&["gains", "--rig", "itu_5_0", "--azimuth", "0"]);
    let gains: Vec<f32> = numeric_rows(&stdout)
        .iter()
        .filter(|r| r.len() == 3)
        .map(|r| r[2])
        .collect();
    assert_eq!(gains.len(), 5);
    let loudest = gains
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    assert_eq!(loudest, Some(1), "{gains:?}");
}

#[test]
fn gains_sweep_prints_one_row_per_step() {
    let stdout = stdout_of(&["gains", "--angles", "0,120,240", "--sweep", "30"]);
    let rows = numeric_rows(&stdout);
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.len() == 4));
}

#[test]
fn gains_stereo_rig_folds_down() {
    let stdout = stdout_of(&["gains", "--rig", "stereo"]);
    assert!(stdout.contains("stereo fold-down"));
}

#[test]
fn gains_rejects_single_speaker() {
    let output = run(&["gains", "--angles", "0"]);
    assert!(!output.status.success());
}

#[test]
fn gains_rejects_unknown_rig() {
    let output = run(&["gains", "--rig", "dodecahedron"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dodecahedron"), "{stderr}");
}

// ---------------------------------------------------------------------------
// abc impulse
// ---------------------------------------------------------------------------

#[test]
fn impulse_dry_passes_through() {
    let stdout = stdout_of(&["impulse", "--factor", "0", "--samples", "4"]);
    let rows = numeric_rows(&stdout);
    assert_eq!(rows.len(), 4);
    // n, W, cos, sin: front impulse at n = 0 only.
    assert_eq!(rows[0], vec![0.0, 1.0, 1.0, 0.0]);
    for row in &rows[1..] {
        assert!(row[1..].iter().all(|v| *v == 0.0), "{row:?}");
    }
}

#[test]
fn impulse_delay_spreads_channels_in_time() {
    let stdout = stdout_of(&[
        "impulse",
        "--factor",
        "1",
        "--max-delay",
        "8",
        "--samples",
        "12",
        "--nonzero",
    ]);
    let rows = numeric_rows(&stdout);
    // Three channels arrive at distinct times.
    assert!(rows.len() >= 2, "{stdout}");
    assert!(rows.iter().all(|r| r[1..].iter().all(|v| v.is_finite())));
}

#[test]
fn impulse_syn_source_fills_the_field() {
    let stdout = stdout_of(&[
        "impulse", "--syn", "--kind", "ring_mod", "--factor", "1", "--order", "2",
    ]);
    let rows = numeric_rows(&stdout);
    assert_eq!(rows[0].len(), 6);
}

#[test]
fn impulse_rejects_bad_kind() {
    let output = run(&["impulse", "--kind", "granular"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// abc rigs
// ---------------------------------------------------------------------------

#[test]
fn rigs_lists_factory_rigs() {
    let stdout = stdout_of(&["rigs"]);
    for id in ["stereo", "quad", "itu_5_0", "hexagon", "octagon", "diffuse_quad"] {
        assert!(stdout.contains(id), "missing {id}");
    }
}

#[test]
fn rigs_prints_toml() {
    let stdout = stdout_of(&["rigs", "octagon"]);
    assert!(stdout.contains("[layout]"));
    assert!(stdout.contains("in_phase"));
}

#[test]
fn help_lists_subcommands() {
    let stdout = stdout_of(&["--help"]);
    for cmd in ["curves", "harmonics", "gains", "impulse", "rigs"] {
        assert!(stdout.contains(cmd), "missing {cmd}");
    }
}
