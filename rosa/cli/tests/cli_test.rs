use assert_cmd::Command;

const PROFILES: &str = r#"
profiles:
  - as: rosa-classic
    name_prefix: ci-classic
    region: us-east-2
"#;

#[test]
fn help() {
    let mut cmd = Command::cargo_bin("rosa-fixture").unwrap();
    cmd.arg("--help");
    let output = cmd.assert().success().get_output().stdout.clone();
    let help = String::from_utf8(output).unwrap();
    for subcommand in ["create", "wait", "destroy", "flags"] {
        assert!(help.contains(subcommand), "'{}' missing from:\n{}", subcommand, help);
    }
}

#[test]
fn profile_is_required() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("rosa-fixture").unwrap();
    cmd.env_remove("TEST_PROFILE")
        .env("SHARED_DIR", dir.path())
        .args(["wait", "--timeout-minutes", "1"]);
    let output = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8(output).unwrap().contains("TEST_PROFILE"));
}

#[test]
fn unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("profiles.yaml"), PROFILES).unwrap();
    let mut cmd = Command::cargo_bin("rosa-fixture").unwrap();
    cmd.env("PROFILES_DIR", dir.path())
        .env("SHARED_DIR", dir.path().join("shared"))
        .args(["--profile", "rosa-hcp", "destroy"]);
    let output = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8(output).unwrap().contains("rosa-hcp"));
}

#[test]
fn wait_without_a_cluster() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("profiles.yaml"), PROFILES).unwrap();
    let mut cmd = Command::cargo_bin("rosa-fixture").unwrap();
    cmd.env("PROFILES_DIR", dir.path())
        .env("SHARED_DIR", dir.path().join("shared"))
        .env("TEST_PROFILE", "rosa-classic")
        .args(["wait", "--timeout-minutes", "1"]);
    let output = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8(output)
        .unwrap()
        .contains("no cluster has been created"));
    // The failed wait still leaves its records behind.
    assert_eq!(
        std::fs::read_to_string(dir.path().join("shared/cluster-type")).unwrap(),
        "rosa"
    );
}
