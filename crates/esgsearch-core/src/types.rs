//! Domain types used by the text, vector and hybrid engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub type DocId = String;
pub type Meta = serde_json::Map<String, Value>;

/// Fields the lexical index tokenizes when no explicit list is given.
pub const DEFAULT_LEXICAL_FIELDS: [&str; 4] = ["title", "content", "description", "summary"];

/// A document as handed to the engines by ingestion collaborators.
///
/// - `id`: assigned as `doc_N` by the hybrid engine when absent
/// - `title`/`description`/`content`: the main text payload
/// - `extra`: any additional fields (e.g. `summary`, `url`), flattened on the wire
///
/// Each index stores its own clone; documents are never shared by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Meta,
}

impl Document {
    pub fn new(title: impl Into<String>, description: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: None, title: title.into(), description: description.into(), content: content.into(), extra: Meta::new() }
    }

    pub fn with_id(mut self, id: impl Into<DocId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Text of a named field. Non-string extra fields have no text.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            "title" => Some(self.title.as_str()),
            "description" => Some(self.description.as_str()),
            "content" => Some(self.content.as_str()),
            other => self.extra.get(other).and_then(Value::as_str),
        }
    }

    /// True when at least one of `fields` carries non-blank text.
    pub fn has_text_in<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        fields
            .iter()
            .filter_map(|f| self.field(f.as_ref()))
            .any(|text| !text.trim().is_empty())
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Vector,
    Text,
    /// Found by both engines during fusion.
    Hybrid,
}

/// A ranked result.
///
/// `score` is the ranking key: the lexical score in keyword mode, the cosine
/// similarity in vector mode and the fused score in hybrid mode. The per-engine
/// components are kept alongside; an engine that did not see the document
/// contributes `0.0`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub keyword_score: f32,
    pub vector_score: f32,
    pub source: SourceKind,
    #[serde(flatten)]
    pub document: Document,
}

impl SearchHit {
    pub fn keyword(doc_id: impl Into<DocId>, score: f32, document: Document) -> Self {
        Self { doc_id: doc_id.into(), score, keyword_score: score, vector_score: 0.0, source: SourceKind::Text, document }
    }

    pub fn vector(doc_id: impl Into<DocId>, score: f32, document: Document) -> Self {
        Self { doc_id: doc_id.into(), score, keyword_score: 0.0, vector_score: score, source: SourceKind::Vector, document }
    }
}

/// Retrieval strategy for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SearchMode {
    Keyword,
    Vector,
    #[default]
    Hybrid,
}

impl SearchMode {
    /// Parse a mode name. Unrecognised names fall back to `Hybrid`.
    pub fn parse(mode: &str) -> Self {
        match mode.trim().to_ascii_lowercase().as_str() {
            "keyword" => SearchMode::Keyword,
            "vector" => SearchMode::Vector,
            "hybrid" => SearchMode::Hybrid,
            other => {
                tracing::warn!(mode = other, "unknown search mode, falling back to hybrid");
                SearchMode::Hybrid
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Vector => "vector",
            SearchMode::Hybrid => "hybrid",
        }
    }

    /// Whether this mode needs a query embedding.
    pub fn uses_vectors(&self) -> bool {
        !matches!(self, SearchMode::Keyword)
    }
}

impl From<String> for SearchMode {
    fn from(mode: String) -> Self {
        Self::parse(&mode)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subsystem fell back to a lower-quality mode instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degradation {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocId>,
    pub timestamp: DateTime<Utc>,
}

impl Degradation {
    pub fn new(component: &str, failure: impl Into<String>, fallback_used: &str) -> Self {
        Self {
            component: component.to_string(),
            failure: failure.into(),
            fallback_used: fallback_used.to_string(),
            doc_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_document(mut self, doc_id: impl Into<DocId>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }
}

/// Outcome of a search call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub requested_mode: SearchMode,
    /// Mode actually served; differs from `requested_mode` after a degradation.
    pub effective_mode: SearchMode,
    pub hits: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,
}

impl SearchResults {
    pub fn empty(query: &str, mode: SearchMode) -> Self {
        Self { query: query.to_string(), requested_mode: mode, effective_mode: mode, hits: Vec::new(), degradation: None }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn doc_ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.doc_id.as_str()).collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

/// A document that made it into the indexes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    pub id: DocId,
    /// Distinct lexical terms recorded for the document.
    pub terms: usize,
    /// False when the document was indexed lexical-only.
    pub vector_indexed: bool,
    /// True when an earlier document with the same id was overwritten.
    pub replaced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,
}

/// A batch element that could not be indexed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDocument {
    /// Position in the submitted batch.
    pub position: usize,
    pub id: Option<DocId>,
    pub reason: String,
}

/// Per-batch indexing report. Batches never fail as a whole.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    pub indexed: Vec<IndexedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub degraded: Vec<Degradation>,
}

impl IndexReport {
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.indexed.iter().map(|d| d.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub document_count: usize,
    pub last_indexed: Option<DateTime<Utc>>,
    /// Number of distinct terms in the lexical index.
    pub keyword_index_size: usize,
    /// Number of stored vectors.
    pub vector_index_size: usize,
}
