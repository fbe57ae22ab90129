use std::fs;
use tempfile::TempDir;

use esgsearch_core::config::{expand_path, resolve_with_base, Config, EmbeddingProvider};
use esgsearch_core::data_processor::{CollectedDocument, RecordLoader};
use esgsearch_core::types::{Document, SearchMode};
use esgsearch_core::Error;

const RECORD: &str = r#"{"url":"https://example.com/r1","title":"Annual Sustainability Report","description":"ESG disclosures","content":"Scope 1 emissions fell","date":"2024-03-01","isSustainabilityReport":true,"sustainabilityCategories":["emissions"],"sustainabilityMetrics":{"scope1":"120 kt"},"relevanceScore":0.8}"#;

#[test]
fn load_single_jsonl_file_skips_bad_lines() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("records.jsonl");
    fs::write(&file, format!("{RECORD}\nnot json\n\n{{\"title\":\"Second\"}}\n")).unwrap();

    let report = RecordLoader::new().load_path(&file).expect("load");

    assert_eq!(report.files, 1);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.rejected, 1, "one unparsable line");
    assert!(report.records[0].is_sustainability_report);
    assert_eq!(report.records[1].title, "Second");
}

#[test]
fn load_directory_reads_arrays_objects_and_ignores_other_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("a.json"), format!("[{RECORD}, {RECORD}, 7]")).unwrap();
    fs::write(dir.join("nested/b.json"), RECORD).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let report = RecordLoader::new().load_path(dir).expect("load dir");

    assert_eq!(report.files, 2);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.rejected, 1, "the bare number is not a record");
}

#[test]
fn non_utf8_files_do_not_abort_the_directory_load() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.json"), RECORD).unwrap();
    fs::write(dir.join("b.json"), b"{\xff\xfe}").unwrap();
    fs::write(dir.join("c.jsonl"), b"{\"title\":\"Caf\xe9 emissions\"}\n").unwrap();

    let report = RecordLoader::new().load_path(dir).expect("load dir");

    assert_eq!(report.files, 3);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.rejected, 1, "the garbled object is rejected");
    assert_eq!(report.records[0].title, "Annual Sustainability Report");
    assert_eq!(report.records[1].title, "Caf\u{FFFD} emissions");
}

#[test]
fn load_directory_limited_reads_one_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.json"), RECORD).unwrap();
    fs::write(dir.join("b.json"), RECORD).unwrap();

    let report = RecordLoader::new().load_path_limited(dir, 1).expect("load limited");
    assert_eq!(report.files, 1);
    assert_eq!(report.records.len(), 1);
}

#[test]
fn missing_path_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = RecordLoader::new().load_path(&tmp.path().join("absent")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn collected_document_converts_into_indexable_document() {
    let record: CollectedDocument = serde_json::from_str(RECORD).unwrap();
    let doc = Document::from(record);
    assert_eq!(doc.id, None);
    assert_eq!(doc.title, "Annual Sustainability Report");
    assert_eq!(doc.field("url"), Some("https://example.com/r1"));
    assert_eq!(doc.extra["isSustainabilityReport"], true);
    assert_eq!(doc.extra["sustainabilityMetrics"]["scope1"], "120 kt");
}

#[test]
fn config_defaults_without_files() {
    let tmp = TempDir::new().unwrap();
    let settings = Config::load_from(tmp.path(), "test").expect("config").settings().expect("settings");
    assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
    assert_eq!(settings.embedding.dim, 768);
    assert_eq!(settings.search.default_mode, SearchMode::Hybrid);
    assert_eq!(settings.search.default_limit, 10);
    assert_eq!(settings.search.lexical_fields, vec!["title", "content", "description", "summary"]);
}

#[test]
fn config_env_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[embedding]\ndim = 64\n\n[search]\ndefault_mode = \"keyword\"\n").unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[embedding]\ndim = 32\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.embedding.dim, 32);
    assert_eq!(settings.search.default_mode, SearchMode::Keyword);
    assert_eq!(config.get::<usize>("embedding.dim").unwrap(), 32);
}

#[test]
fn config_rejects_hash_embedder_in_production() {
    let tmp = TempDir::new().unwrap();
    let err = Config::load_from(tmp.path(), "prod").err().expect("prod must reject the hash embedder");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn config_rejects_zero_dimension() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[embedding]\ndim = 0\n").unwrap();
    assert!(Config::load_from(tmp.path(), "dev").is_err());
}

#[test]
fn search_limit_is_clamped() {
    let settings = esgsearch_core::config::SearchSettings::default();
    assert_eq!(settings.effective_limit(None), 10);
    assert_eq!(settings.effective_limit(Some(0)), 1);
    assert_eq!(settings.effective_limit(Some(10_000)), 100);
}

#[test]
fn path_helpers_expand_and_resolve() {
    let base = std::path::Path::new("/data");
    assert_eq!(resolve_with_base(base, "records"), base.join("records"));
    assert_eq!(resolve_with_base(base, "/abs/records"), std::path::PathBuf::from("/abs/records"));
    assert_eq!(expand_path("plain/path"), std::path::PathBuf::from("plain/path"));
}
