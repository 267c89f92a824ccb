use queryrunner::cli::{Command, OutputMode, run_with_format};
use queryrunner::store::MemoryStore;
use queryrunner::{Direction, RunnerError, connect_with};
use std::io::Write;

fn fixture() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, r#"{{"name":"Sandy","age":31}}"#).unwrap();
    writeln!(f, r#"{{"name":"Steve","age":25}}"#).unwrap();
    writeln!(f).unwrap();
    writeln!(f, r#"{{"name":"Amy","age":40}}"#).unwrap();
    f
}

fn run(cmd: &Command, mode: OutputMode) -> String {
    let fx = fixture();
    let store = MemoryStore::open_ndjson("dbtable", fx.path()).unwrap();
    let h = connect_with(store);
    let mut buf = Vec::new();
    run_with_format(&h, cmd, mode, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn find_from_fixture_file() {
    let out = run(&Command::Find { filter_json: r#"{"name":{"$regex":"^S"}}"#.into() }, OutputMode::Plain);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Sandy"));
    assert!(lines[1].contains("Steve"));
}

#[test]
fn sort_by_numeric_field() {
    let cmd = Command::Sort { filter_json: "{}".into(), field: "age".into(), direction: Direction::Ascending };
    let out = run(&cmd, OutputMode::Json);
    let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    let ages: Vec<i64> = v.as_array().unwrap().iter().map(|d| d["age"].as_i64().unwrap()).collect();
    assert_eq!(ages, vec![25, 31, 40]);
}

#[test]
fn delete_many_plain_prints_count_then_remaining() {
    let cmd = Command::DeleteMany { filter_json: r#"{"name":{"$regex":"^S"}}"#.into(), show_remaining: true };
    let out = run(&cmd, OutputMode::Plain);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "2");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Amy"));
}

#[test]
fn human_mode_prints_documents() {
    let out = run(&Command::Find { filter_json: r#"{"name":"Amy"}"#.into() }, OutputMode::Human);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("\"Amy\""));
}

#[test]
fn missing_fixture_is_io_error() {
    let err = MemoryStore::open_ndjson("dbtable", "/definitely/not/here.ndjson").err().unwrap();
    assert!(matches!(err, RunnerError::Io(_)));
}
