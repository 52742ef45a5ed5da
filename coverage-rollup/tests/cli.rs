use assert_cmd::Command;

const SNAPSHOT: &str = r#"{
  "name": "demo",
  "packages": [
    {
      "name": "app.ui",
      "classes": [
        {
          "name": "Widget",
          "efferent_packages": ["app.io"],
          "methods": [
            {
              "name": "draw",
              "lines": 4,
              "complexity": 3.0,
              "line_data": [
                {"number": 1, "counter": 1},
                {"number": 2, "counter": 0},
                {"number": 3, "counter": 5},
                {"number": 4, "counter": 0}
              ]
            }
          ]
        },
        {"name": "Shape", "interface": true, "afferent_packages": ["app.io"]}
      ]
    },
    {
      "name": "app.io",
      "classes": [
        {
          "name": "Reader",
          "efferent_packages": ["app.ui"],
          "methods": [
            {
              "name": "read",
              "lines": 2,
              "complexity": 1.0,
              "line_data": [{"number": 1, "counter": 2}, {"number": 2}]
            }
          ]
        }
      ]
    },
    {
      "name": "app.generated",
      "classes": [{"name": "Stub"}]
    }
  ]
}"#;

fn write_snapshot(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn run_json(args: &[&str], dir: &tempfile::TempDir) -> serde_json::Value {
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(args).current_dir(dir.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn prints_version() {
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.arg("-V");
    let output = cmd.assert().get_output().stdout.clone();
    assert!(!output.is_empty());
}

#[test]
fn prints_help() {
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.arg("-?");
    let out = cmd.assert().get_output().stdout.clone();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("Usage:"));
    assert!(s.contains("Ce"));
    assert!(s.contains("Evaluation:"));
}

#[test]
fn aggregates_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let v = run_json(&["demo.json"], &dir);

    assert_eq!(v["meta"]["project"], "demo");
    let packages = v["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 3);
    let ui = &packages[0];
    assert_eq!(ui["name"], "app.ui");
    assert_eq!(ui["lines"], 4);
    assert_eq!(ui["coverage"].as_f64().unwrap(), 50.0);
    assert_eq!(ui["abstractness"].as_f64().unwrap(), 0.5);
    assert_eq!(ui["efference"], serde_json::json!(["app.io"]));
    assert!(ui.get("classes").is_none());
    assert_eq!(ui["evaluation"]["coverage"], "low");
}

#[test]
fn reports_method_faults_and_cycles() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let v = run_json(&["demo.json"], &dir);

    let faults = v["warnings"]["method_faults"].as_array().unwrap();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0]["package"], "app.io");
    assert_eq!(faults[0]["method"], "read");
    assert_eq!(
        v["warnings"]["dependency_cycles"],
        serde_json::json!([["app.io", "app.ui"]])
    );
}

#[test]
fn fail_on_fault_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["--fail-on-fault", "demo.json"])
        .current_dir(dir.path());
    cmd.assert().code(1);
}

#[test]
fn config_excludes_packages() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    std::fs::write(
        dir.path().join(".rollup.toml"),
        "[filter]\nexclude = [\"app.generated\"]\n",
    )
    .unwrap();
    let v = run_json(&["demo.json"], &dir);
    let names: Vec<&str> = v["packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["app.ui", "app.io"]);
    assert_eq!(
        v["warnings"]["skipped_packages"],
        serde_json::json!(["app.generated"])
    );
    assert_eq!(
        v["meta"]["config"]["filter"]["exclude"],
        serde_json::json!(["app.generated"])
    );
}

#[test]
fn all_flag_includes_classes() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let v = run_json(&["-a", "demo.json"], &dir);
    let classes = v["packages"][0]["classes"].as_array().unwrap();
    assert_eq!(classes[0]["name"], "Widget");
    assert_eq!(classes[0]["methods"][0]["total_executions"], 6);
}

#[test]
fn outputs_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["-o", "yaml", "demo.json"]).current_dir(dir.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("packages:"));
    assert!(s.contains("name: app.ui"));
}

#[test]
fn reads_yaml_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(
        &dir,
        "demo.yaml",
        "name: tiny\npackages:\n  - name: core\n    classes:\n      - name: A\n        methods:\n          - name: f\n            lines: 2\n            complexity: 1.0\n            line_data:\n              - number: 1\n                counter: 3\n",
    );
    let v = run_json(&["demo.yaml"], &dir);
    assert_eq!(v["packages"][0]["coverage"].as_f64().unwrap(), 50.0);
}

#[test]
fn coverage_gate_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["--coverage-lt", "60", "demo.json"])
        .current_dir(dir.path());
    cmd.assert().code(1);

    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["--coverage-lt", "0", "demo.json"])
        .current_dir(dir.path());
    cmd.assert().success();
}

#[test]
fn distance_gate_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["--distance-gt", "0.1", "demo.json"])
        .current_dir(dir.path());
    cmd.assert().code(1);
}

#[test]
fn init_writes_template_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.arg("init").current_dir(dir.path());
    cmd.assert().success();
    let body = std::fs::read_to_string(dir.path().join(".rollup.toml")).unwrap();
    assert!(body.contains("[evaluation.coverage]"));
    assert!(body.contains("[filter]"));

    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.arg("init").current_dir(dir.path());
    let out = cmd.assert().success().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&out).contains("already exists"));
}

#[test]
fn missing_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.arg("absent.json").current_dir(dir.path());
    cmd.assert().failure();
}

#[test]
fn unknown_format_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["-o", "xml", "demo.json"]).current_dir(dir.path());
    let assert = cmd.assert().success();
    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown output format"));
}

#[test]
fn invalid_gate_value_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&dir, "demo.json", SNAPSHOT);
    let mut cmd = Command::cargo_bin("coverage-rollup").unwrap();
    cmd.args(["--coverage-lt", "abc", "--distance-gt", "NaN", "demo.json"])
        .current_dir(dir.path());
    let assert = cmd.assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("ignoring invalid --coverage-lt value: abc"));
    assert!(stderr.contains("ignoring invalid --distance-gt value: NaN"));
}

#[test]
fn excluded_package_does_not_form_cycles() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(
        &dir,
        "stale.json",
        r#"{
  "name": "stale",
  "packages": [
    {"name": "app", "classes": [{"name": "Service", "efferent_packages": ["gen"]}]},
    {"name": "gen", "efference": ["app"]}
  ]
}"#,
    );
    std::fs::write(
        dir.path().join(".rollup.toml"),
        "[filter]\nexclude = [\"gen\"]\n",
    )
    .unwrap();
    let v = run_json(&["stale.json"], &dir);
    assert_eq!(v["warnings"]["skipped_packages"], serde_json::json!(["gen"]));
    assert_eq!(v["warnings"]["dependency_cycles"], serde_json::json!([]));
}
