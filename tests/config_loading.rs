// tests/config_loading.rs
use ai_assistant_activity::config::analysis::ENV_CONFIG_PATH;
use ai_assistant_activity::config::env::{ENV_OUTPUT_PATH, ENV_PLOTS_DIR};
use ai_assistant_activity::config::{AnalysisConfig, RuntimePaths};
use ai_assistant_activity::github::Credential;
use ai_assistant_activity::SearchError;
use std::path::PathBuf;
use std::{env, fs};

const ONE_ASSISTANT: &str = r#"
anchor_date = "2025-03-03"

[pacing]
query_pause_ms = 0
assistant_pause_secs = 0

[[assistant]]
name = "Only"
login = "only-bot"
"#;

#[test]
fn load_from_reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("assistants.toml");
    fs::write(&p, ONE_ASSISTANT).unwrap();

    let cfg = AnalysisConfig::load_from(&p).unwrap();
    assert_eq!(cfg.assistants.len(), 1);
    assert_eq!(cfg.assistants[0].login, "only-bot");
    assert_eq!(cfg.pacing.query_pause_ms, 0);
}

#[test]
fn load_from_reports_path_on_bad_content() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.toml");
    fs::write(&p, "anchor_date = 12").unwrap();

    let err = AnalysisConfig::load_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_local_file_then_builtin() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing on disk: built-in copy.
    let builtin = AnalysisConfig::load_default().unwrap();
    assert_eq!(builtin, AnalysisConfig::builtin().unwrap());

    // 2) Local config/assistants.toml.
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/assistants.toml"), ONE_ASSISTANT).unwrap();
    let local = AnalysisConfig::load_default().unwrap();
    assert_eq!(local.assistants[0].name, "Only");

    // 3) Env var wins, and a dangling path is an error.
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, ONE_ASSISTANT.replace("Only", "FromEnv")).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    let from_env = AnalysisConfig::load_default().unwrap();
    assert_eq!(from_env.assistants[0].name, "FromEnv");

    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(AnalysisConfig::load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn runtime_paths_follow_env() {
    env::remove_var(ENV_OUTPUT_PATH);
    env::remove_var(ENV_PLOTS_DIR);
    let defaults = RuntimePaths::from_env();
    assert_eq!(
        defaults.snapshot,
        PathBuf::from("data/ai_assistant_github_analysis.json")
    );
    assert_eq!(defaults.plots_dir, PathBuf::from("plots"));

    env::set_var(ENV_OUTPUT_PATH, "/tmp/out.json");
    env::set_var(ENV_PLOTS_DIR, "/tmp/charts");
    let custom = RuntimePaths::from_env();
    assert_eq!(custom.snapshot, PathBuf::from("/tmp/out.json"));
    assert_eq!(custom.plots_dir, PathBuf::from("/tmp/charts"));
    env::remove_var(ENV_OUTPUT_PATH);
    env::remove_var(ENV_PLOTS_DIR);
}

#[serial_test::serial]
#[test]
fn credential_requires_non_empty_token() {
    env::remove_var("GITHUB_TOKEN");
    assert!(matches!(
        Credential::from_env(),
        Err(SearchError::MissingCredential)
    ));

    env::set_var("GITHUB_TOKEN", "  ");
    assert!(matches!(
        Credential::from_env(),
        Err(SearchError::MissingCredential)
    ));

    env::set_var("GITHUB_TOKEN", "ghp_example");
    assert!(Credential::from_env().is_ok());
    env::remove_var("GITHUB_TOKEN");
}
