//! Loading of already-extracted collector records.
//!
//! Collectors (scrapers, report fetchers) run outside this workspace and drop
//! their output as `.json` (one object or an array) or `.jsonl` files. The loader
//! walks a file or directory tree and turns every well-formed record into a
//! [`CollectedDocument`]; malformed records are counted and skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{Document, Meta};

/// Record shape produced by the document collectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectedDocument {
    pub url: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub date: Option<String>,
    pub is_sustainability_report: bool,
    pub sustainability_categories: Vec<String>,
    pub sustainability_metrics: BTreeMap<String, String>,
    pub relevance_score: f32,
}

impl From<CollectedDocument> for Document {
    fn from(record: CollectedDocument) -> Self {
        let mut extra = Meta::new();
        if !record.url.is_empty() {
            extra.insert("url".to_string(), Value::from(record.url));
        }
        if let Some(date) = record.date {
            extra.insert("date".to_string(), Value::from(date));
        }
        extra.insert("isSustainabilityReport".to_string(), Value::from(record.is_sustainability_report));
        extra.insert("sustainabilityCategories".to_string(), Value::from(record.sustainability_categories));
        let metrics: Meta = record
            .sustainability_metrics
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();
        extra.insert("sustainabilityMetrics".to_string(), Value::Object(metrics));
        extra.insert("relevanceScore".to_string(), Value::from(record.relevance_score));
        Document { id: None, title: record.title, description: record.description, content: record.content, extra }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<CollectedDocument>,
    pub files: usize,
    /// Records that failed to parse.
    pub rejected: usize,
}

impl LoadReport {
    pub fn into_documents(self) -> Vec<Document> {
        self.records.into_iter().map(Document::from).collect()
    }
}

#[derive(Default)]
pub struct RecordLoader;

impl RecordLoader {
    pub fn new() -> Self { Self }

    /// Load every record below `path` (a file or a directory).
    pub fn load_path(&self, path: &Path) -> Result<LoadReport> {
        self.load_path_limited(path, usize::MAX)
    }

    /// Like [`load_path`](Self::load_path) but reads at most `limit` files.
    pub fn load_path_limited(&self, path: &Path, limit: usize) -> Result<LoadReport> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let mut files = if path.is_file() { vec![path.to_path_buf()] } else { self.list_record_files(path) };
        if files.is_empty() {
            tracing::warn!(path = %path.display(), "no .json or .jsonl files found");
            return Ok(LoadReport::default());
        }
        if files.len() > limit {
            files.truncate(limit);
            tracing::info!(limit, "limited record files");
        }
        let mut report = LoadReport::default();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), n = file_index + 1, of = files.len(), "loading records");
            let text = read_file_content(file_path)?;
            let (records, rejected) = if is_jsonl(file_path) { parse_jsonl(&text) } else { parse_json(&text) };
            if rejected > 0 {
                tracing::warn!(file = %file_path.display(), rejected, "skipped malformed records");
            }
            report.records.extend(records);
            report.rejected += rejected;
            report.files += 1;
        }
        tracing::info!(files = report.files, records = report.records.len(), rejected = report.rejected, "loaded collector records");
        Ok(report)
    }

    fn list_record_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut record_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json") | Some("jsonl")))
            .collect();
        record_files.sort();
        record_files
    }
}

/// File text, decoding invalid UTF-8 lossily so the remaining records survive.
fn read_file_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!(file = %path.display(), "file is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
        }
        Err(e) => Err(e.into()),
    }
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("jsonl")
}

fn parse_jsonl(text: &str) -> (Vec<CollectedDocument>, usize) {
    let mut records = Vec::new();
    let mut rejected = 0;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<CollectedDocument>(line) {
            Ok(record) => records.push(record),
            Err(_) => rejected += 1,
        }
    }
    (records, rejected)
}

fn parse_json(text: &str) -> (Vec<CollectedDocument>, usize) {
    let values = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(other) => vec![other],
        Err(_) => return (Vec::new(), 1),
    };
    let mut records = Vec::new();
    let mut rejected = 0;
    for value in values {
        match serde_json::from_value::<CollectedDocument>(value) {
            Ok(record) => records.push(record),
            Err(_) => rejected += 1,
        }
    }
    (records, rejected)
}
