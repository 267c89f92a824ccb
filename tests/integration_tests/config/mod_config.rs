use queryrunner::RunnerError;
use queryrunner::config::AppConfig;
use std::io::Write;

#[test]
fn config_file_fills_unset_fields() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "host = \"mongo.local\"").unwrap();
    writeln!(f, "database = \"shop\"").unwrap();
    writeln!(f, "format = \"json\"").unwrap();
    let file_cfg = AppConfig::from_file(f.path()).unwrap();

    let mut cfg = AppConfig { database: Some("override".into()), ..AppConfig::default() };
    cfg.fill_from(file_cfg);
    let t = cfg.target();
    assert_eq!(t.host, "mongo.local");
    assert_eq!(t.database, "override");
    assert_eq!(t.port, 27017);
    assert_eq!(cfg.format.as_deref(), Some("json"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let err = AppConfig::from_file(std::path::Path::new("/no/such/queryrunner.toml")).unwrap_err();
    assert!(matches!(err, RunnerError::Config(_)));
}

#[test]
fn uri_in_config_drives_connection_string() {
    let cfg = AppConfig::from_toml_str("uri = \"mongodb://a:1,b:2/?replicaSet=rs\"").unwrap();
    assert_eq!(cfg.target().connection_uri(), "mongodb://a:1,b:2/?replicaSet=rs");
}
