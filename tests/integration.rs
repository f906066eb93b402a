use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> (bool, String) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_growthlab"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    (
        output.status.success(),
        format!("args: {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"),
    )
}

fn setup_dir(name: &str, config_contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    test_dir
}

#[test]
fn basic_workflow() {
    let config_contents = String::new()
        + "[exponential]\n"
        + "p0 = 10.0\n"
        + "r = 0.2\n"
        + "\n"
        + "[logistic]\n"
        + "p0 = 10.0\n"
        + "r = 0.15\n"
        + "k = 150.0\n"
        + "t_max = 60.0\n"
        + "t_eval = 20.0\n"
        + "\n"
        + "[richards]\n"
        + "p0 = 100.0\n"
        + "r = 0.2\n"
        + "k = 100.0\n"
        + "nu = 0.8\n"
        + "\n"
        + "[predator_prey]\n"
        + "x0 = 40.0\n"
        + "y0 = 9.0\n"
        + "alpha = 1.0\n"
        + "beta = 0.1\n"
        + "gamma = 1.5\n"
        + "delta = 0.075\n"
        + "t_max = 15.0\n";
    let test_dir = setup_dir("basic_workflow", &config_contents);
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "run"]);
    assert!(success, "failed to run binary with {log}");
    // Richards with P0 == K is only a warning.
    assert!(log.contains("0 < P0 < K"), "missing warning in {log}");

    for model in ["exponential", "logistic", "predator-prey"] {
        let file = test_dir.join(format!("trajectory-{model}.msgpack"));
        assert!(file.is_file(), "missing {file:?}");
    }
    assert!(!test_dir.join("trajectory-richards.msgpack").exists());

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "run", "--model", "logistic"]);
    assert!(success, "failed to run binary with {log}");

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "analyze"]);
    assert!(success, "failed to run binary with {log}");

    let results = fs::read_to_string(test_dir.join("results.json"))
        .expect("failed to read results file");
    let results: serde_json::Value =
        serde_json::from_str(&results).expect("failed to parse results file");
    let reports = results.as_array().expect("results must be a list");
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().any(|report| report["model"] == "predator_prey"));

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(success, "failed to run binary with {log}");
    assert!(!test_dir.join("results.json").exists());
    assert!(!test_dir.join("trajectory-logistic.msgpack").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn unconfigured_model_fails() {
    let test_dir = setup_dir("unconfigured_model", "[exponential]\np0 = 10.0\nr = 0.2\n");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "run", "--model", "gompertz"]);
    assert!(!success, "unexpected success with {log}");

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "analyze"]);
    assert!(!success, "unexpected success with {log}");

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn malformed_config_fails() {
    let test_dir = setup_dir("malformed_config", "[exponential]\np0 = \"ten\"\nr = 0.2\n");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let (success, log) = run_bin(&["--sim-dir", test_dir_str, "run"]);
    assert!(!success, "unexpected success with {log}");

    fs::remove_dir_all(&test_dir).ok();
}
