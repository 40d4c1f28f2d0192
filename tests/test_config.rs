use tideway::config::{Config, CONFIG_ENV, LISTEN_ENV};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.read_chunk_size, 8 * 1024);
    assert_eq!(cfg.flush_threshold, 256 * 1024);
    assert_eq!(cfg.max_header_size, 112 * 1024);
    assert_eq!(cfg.level().unwrap(), tracing::Level::INFO);
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml("listen_addr: 0.0.0.0:3000\nflush_threshold: 4096\n").unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.flush_threshold, 4096);
    assert_eq!(cfg.read_chunk_size, 8 * 1024);
}

#[test]
fn test_config_connection_settings() {
    let cfg = Config::from_yaml("read_chunk_size: 1024\nmax_header_size: 2048\n").unwrap();
    let conn = cfg.connection();

    assert_eq!(conn.read_chunk_size, 1024);
    assert_eq!(conn.max_header_size, 2048);
    assert_eq!(conn.flush_threshold, 256 * 1024);
}

#[test]
fn test_config_rejects_zero_sizes() {
    assert!(Config::from_yaml("flush_threshold: 0\n").is_err());
    assert!(Config::from_yaml("read_chunk_size: 0\n").is_err());
}

#[test]
fn test_config_rejects_unknown_log_level() {
    assert!(Config::from_yaml("log_level: chatty\n").is_err());
    assert!(Config::from_yaml("log_level: debug\n").is_ok());
}

#[test]
fn test_config_rejects_malformed_yaml() {
    assert!(Config::from_yaml("flush_threshold: [1, 2\n").is_err());
}

#[test]
fn test_config_missing_file() {
    let err = Config::from_file("/nonexistent/tideway.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/tideway.yaml"));
}

// Environment variables are process-wide, so every env-dependent case lives
// in this one test.
#[test]
fn test_config_load_from_env() {
    let path = std::env::temp_dir().join(format!("tideway-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "listen_addr: 127.0.0.1:9000\nlog_level: warn\n").unwrap();

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");

    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.level().unwrap(), tracing::Level::WARN);

    unsafe {
        std::env::set_var(LISTEN_ENV, "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    std::fs::remove_file(&path).unwrap();
}
