use super::*;

fn sample(data_dir: &str) -> Config {
    Config {
        host: "0.0.0.0".to_string(),
        port: 7420,
        data_dir: PathBuf::from(data_dir),
        tmux_socket: None,
        log_format: "json".to_string(),
        log_level: "info".to_string(),
        shell_wait_timeout_secs: 10,
        init_timeout_secs: 45,
        scheduler_poll_secs: 5,
    }
}

#[test]
fn zero_port_is_rejected() {
    let mut config = sample("./data");
    config.port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn unknown_log_format_is_rejected() {
    let mut config = sample("./data");
    config.log_format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn valid_config_passes_validation() {
    assert!(sample("./data").validate().is_ok());
}

#[test]
fn store_and_log_paths_are_nested_under_data_dir() {
    let config = sample("/tmp/fleet-test");
    assert_eq!(config.store_path(), PathBuf::from("/tmp/fleet-test/store.jsonl"));
    assert_eq!(config.log_root(), PathBuf::from("/tmp/fleet-test/logs"));
}

#[test]
fn core_config_timeouts_come_from_cli_flags() {
    let mut config = sample("./data");
    config.shell_wait_timeout_secs = 3;
    config.init_timeout_secs = 9;
    let core = config.to_core_config();
    assert_eq!(core.shell_wait_timeout, std::time::Duration::from_secs(3));
    assert_eq!(core.init_timeout, std::time::Duration::from_secs(9));
}
