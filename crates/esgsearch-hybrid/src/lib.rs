//! Hybrid retrieval: one lexical index and one vector index behind a single
//! reader/writer lock, with fixed-weight score fusion.
//!
//! Indexing embeds documents before taking the lock and commits a whole batch
//! in one write section, so readers never observe a partial batch. Embedding
//! failures never abort indexing or searching: documents fall back to
//! lexical-only indexing and queries to keyword search, and the fallback is
//! reported alongside the result.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use esgsearch_core::config::SearchSettings;
use esgsearch_core::traits::{SearchEngine, TextEmbedder, TextIndexer, VectorIndexer};
use esgsearch_core::types::{
    Degradation, DocId, Document, IndexReport, IndexStats, IndexedDocument, SearchHit, SearchMode, SearchResults,
    SkippedDocument, SourceKind,
};
use esgsearch_core::{Error, Result};
use esgsearch_query::ProcessedQuery;
use esgsearch_text::LexicalIndex;
use esgsearch_vector::VectorIndex;

pub const KEYWORD_WEIGHT: f32 = 0.4;
pub const VECTOR_WEIGHT: f32 = 0.6;
/// Content characters included in the embedding text.
pub const EMBEDDING_CONTENT_CHARS: usize = 1000;
/// Per-side candidate multiplier for hybrid fusion.
pub const CANDIDATE_FACTOR: usize = 2;

/// `title + " " + description + " " + content[..1000 chars]`.
pub fn document_to_embedding_text(document: &Document) -> String {
    let content: String = document.content.chars().take(EMBEDDING_CONTENT_CHARS).collect();
    format!("{} {} {}", document.title, document.description, content)
}

/// Weighted sum of the per-engine scores.
pub fn fuse_scores(keyword_score: f32, vector_score: f32) -> f32 {
    keyword_score * KEYWORD_WEIGHT + vector_score * VECTOR_WEIGHT
}

struct EngineState<TI, VI> {
    text: TI,
    vector: VI,
    next_id: u64,
    last_indexed: Option<DateTime<Utc>>,
}

impl<TI: TextIndexer, VI: VectorIndexer> EngineState<TI, VI> {
    /// Next free `doc_N`, skipping ids in the index and ids `reserved` by the
    /// batch being committed.
    fn next_doc_id(&mut self, reserved: &HashSet<DocId>) -> DocId {
        loop {
            let candidate = format!("doc_{}", self.next_id);
            self.next_id += 1;
            if !self.text.contains(&candidate) && !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// A batch element that passed validation, with its embedding outcome.
struct Prepared {
    position: usize,
    document: Document,
    vector: std::result::Result<Vec<f32>, Error>,
}

pub struct HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    state: RwLock<EngineState<TI, VI>>,
    embedder: Arc<dyn TextEmbedder>,
}

impl HybridSearchEngine<LexicalIndex, VectorIndex> {
    /// In-memory engine with default lexical fields and the embedder's dimension.
    pub fn in_memory(embedder: Arc<dyn TextEmbedder>) -> Self {
        let vector = VectorIndex::new(embedder.dim());
        Self::new(LexicalIndex::new(), vector, embedder)
    }

    /// In-memory engine tokenizing the configured lexical fields.
    pub fn from_settings(settings: &SearchSettings, embedder: Arc<dyn TextEmbedder>) -> Self {
        let text = LexicalIndex::with_fields(settings.lexical_fields.iter().cloned());
        let vector = VectorIndex::new(embedder.dim());
        Self::new(text, vector, embedder)
    }
}

impl<TI, VI> HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn new(text: TI, vector: VI, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self { state: RwLock::new(EngineState { text, vector, next_id: 0, last_indexed: None }), embedder }
    }

    pub fn embedder(&self) -> &dyn TextEmbedder {
        self.embedder.as_ref()
    }

    /// Index one document. A document with no text in any indexed field is
    /// rejected with [`Error::MalformedDocument`].
    pub fn index_document(&self, document: Document) -> Result<IndexedDocument> {
        let mut report = self.index_documents(vec![document]);
        if let Some(skipped) = report.skipped.pop() {
            return Err(Error::MalformedDocument(skipped.reason));
        }
        report
            .indexed
            .pop()
            .ok_or_else(|| Error::Operation("document was neither indexed nor skipped".to_string()))
    }

    /// Index a batch. Never fails as a whole: malformed documents are skipped
    /// and embedding failures degrade single documents to lexical-only.
    pub fn index_documents(&self, documents: Vec<Document>) -> IndexReport {
        let mut report = IndexReport::default();
        let fields: Vec<String> = self.state.read().text.indexed_fields().to_vec();

        let mut valid = Vec::with_capacity(documents.len());
        for (position, document) in documents.into_iter().enumerate() {
            if document.has_text_in(&fields) {
                valid.push((position, document));
            } else {
                tracing::warn!(position, id = ?document.id, "skipping document without indexable text");
                report.skipped.push(SkippedDocument {
                    position,
                    id: document.id.clone(),
                    reason: format!("no text in any of the fields {:?}", fields),
                });
            }
        }
        if valid.is_empty() {
            return report;
        }

        let prepared = self.embed_documents(valid);
        let reserved: HashSet<DocId> = prepared.iter().filter_map(|p| p.document.id.clone()).collect();

        let mut state = self.state.write();
        for item in prepared {
            let Prepared { position, mut document, vector } = item;
            let id = match document.id.clone() {
                Some(id) => id,
                None => {
                    let id = state.next_doc_id(&reserved);
                    document.id = Some(id.clone());
                    id
                }
            };
            let replaced = state.text.contains(&id);
            state.vector.remove_document(&id);

            let degradation = match vector.and_then(|v| state.vector.add_document(&id, &document, &v)) {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(doc_id = %id, position, error = %e, "indexing lexical-only");
                    Some(Degradation::new("embedder", e.to_string(), "lexical-only").for_document(id.clone()))
                }
            };
            let terms = state.text.add_document(&id, &document);

            if let Some(d) = &degradation {
                report.degraded.push(d.clone());
            }
            report.indexed.push(IndexedDocument { id, terms, vector_indexed: degradation.is_none(), replaced, degradation });
        }
        if !report.indexed.is_empty() {
            state.last_indexed = Some(Utc::now());
        }
        drop(state);

        tracing::info!(
            indexed = report.indexed_count(),
            skipped = report.skipped_count(),
            degraded = report.degraded_count(),
            "indexed batch"
        );
        report
    }

    fn embed_documents(&self, valid: Vec<(usize, Document)>) -> Vec<Prepared> {
        let texts: Vec<String> = valid.iter().map(|(_, d)| document_to_embedding_text(d)).collect();
        match self.embedder.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == valid.len() => valid
                .into_iter()
                .zip(vectors)
                .map(|((position, document), v)| Prepared { position, document, vector: Ok(v) })
                .collect(),
            batch => {
                if let Err(e) = &batch {
                    tracing::debug!(error = %e, "batch embedding failed, embedding documents one by one");
                }
                valid
                    .into_iter()
                    .zip(texts)
                    .map(|((position, document), text)| Prepared {
                        position,
                        document,
                        vector: self.embedder.encode_text(&text),
                    })
                    .collect()
            }
        }
    }

    /// Ranked search. Blank queries return no hits in every mode.
    pub fn search(&self, query: &str, mode: SearchMode, max_results: usize) -> Result<SearchResults> {
        let mut results = SearchResults::empty(query, mode);
        if query.trim().is_empty() || max_results == 0 {
            return Ok(results);
        }

        if !mode.uses_vectors() {
            results.hits = self.state.read().text.search(query, max_results);
            return Ok(results);
        }

        let query_vec = match self.embedder.encode_text(query) {
            Ok(v) => v,
            Err(e) if e.is_embedding_failure() => return Ok(self.degrade_to_keyword(results, e, max_results)),
            Err(e) => return Err(e),
        };

        let state = self.state.read();
        let candidates = if mode == SearchMode::Hybrid { max_results.saturating_mul(CANDIDATE_FACTOR) } else { max_results };
        let searched = state.vector.search_vec(&query_vec, candidates);
        let vector_hits = match searched {
            Ok(hits) => hits,
            Err(e) if e.is_embedding_failure() => {
                drop(state);
                return Ok(self.degrade_to_keyword(results, e, max_results));
            }
            Err(e) => return Err(e),
        };

        results.hits = match mode {
            SearchMode::Vector => vector_hits,
            _ => fuse(state.text.search(query, candidates), vector_hits, max_results),
        };
        tracing::debug!(mode = %mode, hits = results.hits.len(), "search");
        Ok(results)
    }

    fn degrade_to_keyword(&self, mut results: SearchResults, error: Error, max_results: usize) -> SearchResults {
        tracing::warn!(error = %error, requested = %results.requested_mode, "query embedding failed, serving keyword results");
        results.effective_mode = SearchMode::Keyword;
        results.degradation = Some(Degradation::new("embedder", error.to_string(), "keyword"));
        results.hits = self.state.read().text.search(&results.query, max_results);
        results
    }

    /// Search with the expanded form of a processed query.
    pub fn search_processed(&self, processed: &ProcessedQuery, mode: SearchMode, max_results: usize) -> Result<SearchResults> {
        self.search(processed.search_text(), mode, max_results)
    }

    /// Remove a document from both indexes.
    pub fn remove_document(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let in_text = state.text.remove_document(id);
        let in_vector = state.vector.remove_document(id);
        in_text || in_vector
    }

    pub fn stats(&self) -> IndexStats {
        let state = self.state.read();
        IndexStats {
            document_count: state.text.document_count(),
            last_indexed: state.last_indexed,
            keyword_index_size: state.text.term_count(),
            vector_index_size: state.vector.len(),
        }
    }
}

/// Merge per-engine hits by id: `combined = keyword * 0.4 + vector * 0.6`, a
/// side that did not return the document contributing `0`. Sorted by combined
/// score descending, ties by id.
pub fn fuse(keyword_hits: Vec<SearchHit>, vector_hits: Vec<SearchHit>, max_results: usize) -> Vec<SearchHit> {
    let mut by_id: HashMap<DocId, SearchHit> = HashMap::new();
    for hit in keyword_hits {
        by_id.insert(hit.doc_id.clone(), SearchHit { vector_score: 0.0, ..hit });
    }
    for hit in vector_hits {
        by_id
            .entry(hit.doc_id.clone())
            .and_modify(|existing| {
                existing.vector_score = hit.vector_score;
                existing.source = SourceKind::Hybrid;
            })
            .or_insert(SearchHit { keyword_score: 0.0, ..hit });
    }

    let mut merged: Vec<SearchHit> = by_id
        .into_values()
        .map(|mut hit| {
            hit.score = fuse_scores(hit.keyword_score, hit.vector_score);
            hit
        })
        .collect();
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.doc_id.cmp(&b.doc_id)));
    merged.truncate(max_results);
    merged
}

impl<TI, VI> SearchEngine for HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    fn index(&self, documents: Vec<Document>) -> IndexReport { Self::index_documents(self, documents) }
    fn query(&self, query: &str, mode: SearchMode, k: usize) -> Result<SearchResults> { Self::search(self, query, mode, k) }
    fn stats(&self) -> IndexStats { Self::stats(self) }
}
