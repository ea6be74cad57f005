use std::path::Path;

use telemetry_service::config::{AppConfig, ConfigError};

#[test]
fn empty_file_uses_defaults() {
    let cfg = AppConfig::load_from_str("").expect("must parse");
    assert_eq!(cfg.server.bind_addr, "0.0.0.0:8000");
    assert_eq!(cfg.server.service_name, "weidun-api");
    assert_eq!(cfg.api.default_site, "Site A");
    assert_eq!(cfg.store.path, Path::new("data/performance.db"));
    assert!(cfg.metrics.is_none());
}

#[test]
fn full_file_overrides_every_section() {
    let ok = r#"
[server]
bind_addr = "127.0.0.1:9000"
service_name = "solar-api"

[store]
path = "/var/lib/solar/perf.db"
busy_timeout_ms = 250

[api]
default_site = "Roof East"

[metrics]
bind_addr = "127.0.0.1:9100"
"#;
    let cfg = AppConfig::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.bind_addr, "127.0.0.1:9000");
    assert_eq!(cfg.server.service_name, "solar-api");
    assert_eq!(cfg.store.path, Path::new("/var/lib/solar/perf.db"));
    assert_eq!(cfg.store.busy_timeout_ms, 250);
    assert_eq!(cfg.api.default_site, "Roof East");
    assert_eq!(cfg.metrics.unwrap().bind_addr, "127.0.0.1:9100");
}

#[test]
fn unknown_fields_are_rejected() {
    let bad = r#"
[store]
path = "perf.db"
pathh = "typo.db"
"#;
    let err = AppConfig::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn bad_bind_addr_is_rejected() {
    let bad = r#"
[server]
bind_addr = "localhost"
"#;
    let err = AppConfig::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn empty_default_site_is_rejected() {
    let bad = r#"
[api]
default_site = ""
"#;
    assert!(matches!(AppConfig::load_from_str(bad), Err(ConfigError::Invalid(_))));
}

#[test]
fn missing_explicit_file_is_a_read_error() {
    let err = AppConfig::load_from_file("/definitely/not/here.toml").expect_err("must fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}
