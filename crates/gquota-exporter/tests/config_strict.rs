#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::io::Write;

use gquota_exporter::config;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k: &str| map.get(k).cloned()
}

#[test]
fn deny_unknown_fields() {
    let bad = r#"
project_id: "foo"
refresh_interval: 30 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("project_id: foo\n").expect("must parse");
    assert_eq!(cfg.project_id, "foo");
    assert_eq!(cfg.refresh_interval_secs, 60);
    assert_eq!(cfg.listen, "0.0.0.0:8000");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert!(cfg.access_token.is_none());
}

#[test]
fn missing_project_is_fatal() {
    let err = config::from_lookup(env(&[])).expect_err("must fail");
    assert!(err.is_fatal());
    assert!(err.to_string().contains("QE_PROJECT_ID"));

    let err = config::from_lookup(env(&[("QE_PROJECT_ID", "  ")])).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn env_only() {
    let cfg = config::from_lookup(env(&[
        ("QE_PROJECT_ID", "foo"),
        ("QE_REFRESH_INTERVAL", "120"),
        ("QE_LISTEN", "127.0.0.1:9100"),
    ]))
    .unwrap();
    assert_eq!(cfg.project_id, "foo");
    assert_eq!(cfg.refresh_interval_secs, 120);
    assert_eq!(cfg.listen_addr().unwrap().port(), 9100);
}

#[test]
fn interval_must_be_positive_number() {
    let err = config::from_lookup(env(&[
        ("QE_PROJECT_ID", "foo"),
        ("QE_REFRESH_INTERVAL", "soon"),
    ]))
    .expect_err("must fail");
    assert!(err.to_string().contains("QE_REFRESH_INTERVAL must be a number"));

    let err = config::from_lookup(env(&[
        ("QE_PROJECT_ID", "foo"),
        ("QE_REFRESH_INTERVAL", "0"),
    ]))
    .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn bad_listen_addr() {
    let err = config::from_lookup(env(&[("QE_PROJECT_ID", "foo"), ("QE_LISTEN", "8000")]))
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn env_overrides_file() {
    let path = std::env::temp_dir().join(format!("gquota-config-{}.yaml", std::process::id()));
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "project_id: from-file\nrefresh_interval_secs: 300\naccess_token: abc").unwrap();
    drop(f);

    let path_str = path.to_string_lossy().to_string();
    let cfg = config::from_lookup(env(&[
        ("QE_CONFIG", path_str.as_str()),
        ("QE_PROJECT_ID", "from-env"),
    ]))
    .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.project_id, "from-env");
    assert_eq!(cfg.refresh_interval_secs, 300);
    assert_eq!(cfg.access_token.as_deref(), Some("abc"));
}

#[test]
fn missing_config_file() {
    let err = config::from_lookup(env(&[
        ("QE_CONFIG", "/nonexistent/gquota.yaml"),
        ("QE_PROJECT_ID", "foo"),
    ]))
    .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn load_from_file_validates() {
    let path = std::env::temp_dir().join(format!("gquota-file-{}.yaml", std::process::id()));
    std::fs::write(&path, "refresh_interval_secs: 10\n").unwrap();
    let err = config::load_from_file(&path.to_string_lossy()).expect_err("project_id missing");
    std::fs::remove_file(&path).ok();
    assert_eq!(err.kind().as_str(), "CONFIG");
}
