use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn write_manifest(path: &Path, yaml: &str) {
    fs::write(path, yaml).expect("manifest should write");
}

fn run_glyphheat(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_glyphheat"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("glyphheat command should run")
}

const SMALL_SCENE: &str = r#"
environment:
  grid: { columns: 8, rows: 4 }
  fps: 12
  duration: { frames: 3 }
field:
  scale: 0.02
partition:
  bands:
    - { upper: 0.5, category: blue }
    - { upper: 1.0, category: red }
catalog:
  literals:
    - { category: blue, glyphs: "🌊💙" }
    - { category: red, glyphs: "🍎🍓" }
"#;

#[test]
fn check_reports_grid_and_catalog_summary() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let output = run_glyphheat(dir.path(), &["check", "scene.yaml"]);
    assert!(output.status.success(), "check should succeed");

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(stdout.contains("OK: scene.yaml (8x4 cells, 12 fps, 3 frames)"));
    assert!(stdout.contains("Categories: 2"));
}

#[test]
fn check_rejects_gapped_partition() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("broken.yaml");
    write_manifest(
        &manifest_path,
        r#"
environment:
  grid: { columns: 8, rows: 4 }
  fps: 12
  duration: { frames: 3 }
field:
  scale: 0.02
partition:
  bands:
    - { upper: 0.5, category: blue }
    - { upper: 0.9, category: red }
catalog:
  literals:
    - { category: blue, glyphs: "🌊" }
    - { category: red, glyphs: "🍎" }
"#,
    );

    let output = run_glyphheat(dir.path(), &["check", "broken.yaml"]);
    assert!(!output.status.success(), "gapped bands should fail check");
    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(stderr.contains("end at 1.0"));
}

#[test]
fn render_writes_every_frame_to_the_output_file() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let output = run_glyphheat(dir.path(), &["render", "scene.yaml", "-o", "frames.txt"]);
    assert!(output.status.success(), "render should succeed");

    let rendered = fs::read_to_string(dir.path().join("frames.txt")).expect("frames should exist");
    // 3 frames of 4 rows, separated by blank lines.
    assert_eq!(rendered.lines().count(), 3 * 4 + 2);
}

#[test]
fn render_stats_emits_one_json_line_per_frame() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let output = run_glyphheat(dir.path(), &["render", "scene.yaml", "--stats"]);
    assert!(output.status.success(), "render --stats should succeed");

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);

    for line in lines {
        let stats: Value = serde_json::from_str(line).expect("stats line should be json");
        assert_eq!(stats["total"], 32);
        let counts = stats["counts"].as_object().expect("counts should be a map");
        let sum: u64 = counts.values().map(|value| value.as_u64().unwrap_or(0)).sum();
        assert_eq!(sum, 32);
    }
}

#[test]
fn digest_is_stable_across_invocations() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let first = run_glyphheat(dir.path(), &["digest", "scene.yaml", "--frame", "2"]);
    let second = run_glyphheat(dir.path(), &["digest", "scene.yaml", "--frame", "2"]);
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);

    let digest = String::from_utf8(first.stdout).expect("digest should be utf-8");
    let digest = digest.trim();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn digest_changes_with_overrides() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let base = run_glyphheat(dir.path(), &["digest", "scene.yaml"]);
    let rescaled = run_glyphheat(
        dir.path(),
        &["digest", "scene.yaml", "--set", "field.scale=0.4"],
    );
    assert!(base.status.success() && rescaled.status.success());
    assert_ne!(base.stdout, rescaled.stdout);
}

#[test]
fn unknown_override_key_is_rejected() {
    let dir = tempdir().expect("tempdir should create");
    let manifest_path = dir.path().join("scene.yaml");
    write_manifest(&manifest_path, SMALL_SCENE);

    let output = run_glyphheat(
        dir.path(),
        &["check", "scene.yaml", "--set", "field.zoom=2.0"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(stderr.contains("unknown override key"));
}

#[test]
fn missing_manifest_reports_the_path() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_glyphheat(dir.path(), &["check", "nowhere.yaml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(stderr.contains("nowhere.yaml"));
}
