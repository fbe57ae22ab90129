use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use esgsearch_core::traits::TextIndexer;
use esgsearch_core::types::{DocId, Document, SearchHit, DEFAULT_LEXICAL_FIELDS};

use crate::tokenize::term_set;

pub const TITLE_BOOST: f32 = 3.0;
pub const DEFAULT_BOOST: f32 = 1.0;

/// One occurrence of a term: the document and the field it appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub field: String,
}

struct StoredDocument {
    document: Document,
    terms: BTreeSet<String>,
}

/// Inverted index over tokenized document fields.
///
/// Each term maps to the `(doc_id, field)` pairs it occurs in, one posting per
/// distinct term per field. Scoring for a query term `t`:
///
/// ```text
/// idf(t)   = ln(1 + N / (1 + df(t)))      N = indexed documents, df = documents containing t
/// score(d) = Σ_t Σ_{(d, f) ∈ postings(t)} idf(t) · boost(f)      boost(title) = 3, otherwise 1
/// ```
///
/// The `1 +` inside the log keeps a term found in one of two documents
/// (`N = 2, df = 1`) positive, where `ln(N / (1 + df))` would score it 0.
///
/// Re-adding an id replaces the earlier postings for that id.
pub struct LexicalIndex {
    fields: Vec<String>,
    postings: HashMap<String, Vec<Posting>>,
    documents: HashMap<DocId, StoredDocument>,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::with_fields(DEFAULT_LEXICAL_FIELDS)
    }

    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { fields: fields.into_iter().map(Into::into).collect(), postings: HashMap::new(), documents: HashMap::new() }
    }

    /// Index `document` under `id` using the configured fields.
    pub fn add_document(&mut self, id: &str, document: &Document) -> usize {
        let fields = self.fields.clone();
        self.add_document_with_fields(id, document, &fields)
    }

    /// Index `document` under `id`, tokenizing only `fields`. Returns the number
    /// of distinct terms recorded for the document.
    pub fn add_document_with_fields<S: AsRef<str>>(&mut self, id: &str, document: &Document, fields: &[S]) -> usize {
        self.remove_document(id);

        let mut terms = BTreeSet::new();
        for field in fields {
            let field = field.as_ref();
            let Some(text) = document.field(field) else { continue };
            for term in term_set(text) {
                self.postings
                    .entry(term.clone())
                    .or_default()
                    .push(Posting { doc_id: id.to_string(), field: field.to_string() });
                terms.insert(term);
            }
        }

        let mut stored = document.clone();
        stored.id = Some(id.to_string());
        let count = terms.len();
        self.documents.insert(id.to_string(), StoredDocument { document: stored, terms });
        tracing::debug!(doc_id = id, terms = count, "lexical index add");
        count
    }

    /// Drop a document and all of its postings.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let Some(stored) = self.documents.remove(id) else { return false };
        for term in &stored.terms {
            if let Some(list) = self.postings.get_mut(term) {
                list.retain(|p| p.doc_id != id);
                if list.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        true
    }

    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        if query.trim().is_empty() || max_results == 0 {
            return Vec::new();
        }
        let n = self.documents.len() as f32;
        let mut scores: HashMap<&str, f32> = HashMap::new();

        for term in term_set(query) {
            let Some(list) = self.postings.get(&term) else { continue };
            let df = list.iter().map(|p| p.doc_id.as_str()).collect::<HashSet<_>>().len() as f32;
            // smoothed: ln(N / (1 + df)) is 0 for N = 2, df = 1
            let idf = (1.0 + n / (1.0 + df)).ln();
            for posting in list {
                *scores.entry(posting.doc_id.as_str()).or_insert(0.0) += idf * field_boost(&posting.field);
            }
        }

        let mut ranked: Vec<(&str, f32)> = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_results);

        ranked
            .into_iter()
            .filter_map(|(id, score)| {
                self.documents.get(id).map(|stored| SearchHit::keyword(id, score, stored.document.clone()))
            })
            .collect()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Terms recorded for a document at indexing time.
    pub fn terms_for(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.documents.get(id).map(|d| &d.terms)
    }

    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct terms in the index.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}

fn field_boost(field: &str) -> f32 {
    if field == "title" { TITLE_BOOST } else { DEFAULT_BOOST }
}

impl TextIndexer for LexicalIndex {
    fn add_document(&mut self, id: &str, document: &Document) -> usize { Self::add_document(self, id, document) }
    fn remove_document(&mut self, id: &str) -> bool { Self::remove_document(self, id) }
    fn contains(&self, id: &str) -> bool { Self::contains(self, id) }
    fn search(&self, query: &str, k: usize) -> Vec<SearchHit> { Self::search(self, query, k) }
    fn indexed_fields(&self) -> &[String] { self.fields() }
    fn document_count(&self) -> usize { Self::document_count(self) }
    fn term_count(&self) -> usize { Self::term_count(self) }
}
