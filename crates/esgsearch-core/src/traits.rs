use crate::error::Result;
use crate::types::{Document, IndexReport, IndexStats, SearchHit, SearchMode, SearchResults};

/// Converts text to a fixed-dimension vector.
///
/// Injected into the hybrid engine; the engine never owns a model. Repeated
/// calls with the same input and configuration must be usable for ranking.
pub trait TextEmbedder: Send + Sync {
    /// Short identifier for logs and degradation reports.
    fn name(&self) -> &str;
    fn dim(&self) -> usize;
    fn encode_text(&self, text: &str) -> Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode_text(t)).collect()
    }
}

pub trait TextIndexer: Send + Sync {
    /// Index `document` under `id`, replacing any previous entry. Returns the
    /// number of distinct terms recorded.
    fn add_document(&mut self, id: &str, document: &Document) -> usize;
    fn remove_document(&mut self, id: &str) -> bool;
    fn contains(&self, id: &str) -> bool;
    fn search(&self, query: &str, k: usize) -> Vec<SearchHit>;
    /// Fields tokenized on insertion.
    fn indexed_fields(&self) -> &[String];
    fn document_count(&self) -> usize;
    fn term_count(&self) -> usize;
}

pub trait VectorIndexer: Send + Sync {
    fn dim(&self) -> usize;
    fn add_document(&mut self, id: &str, document: &Document, vector: &[f32]) -> Result<()>;
    fn remove_document(&mut self, id: &str) -> bool;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait SearchEngine: Send + Sync {
    fn index(&self, documents: Vec<Document>) -> IndexReport;
    fn query(&self, query: &str, mode: SearchMode, k: usize) -> Result<SearchResults>;
    fn stats(&self) -> IndexStats;
}
