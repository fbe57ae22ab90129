use std::cmp::Ordering;
use std::collections::HashMap;

use esgsearch_core::traits::VectorIndexer;
use esgsearch_core::types::{DocId, Document, SearchHit};
use esgsearch_core::{Error, Result};

struct Entry {
    vector: Vec<f32>,
    document: Document,
}

/// In-memory exact nearest-neighbour index over unit vectors.
///
/// Every stored vector and every query vector is L2-normalized, so the dot
/// product is the cosine similarity. All vectors share the dimension fixed at
/// construction.
pub struct VectorIndex {
    dim: usize,
    entries: HashMap<DocId, Entry>,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, entries: HashMap::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Store `vector` for `id`, replacing any previous entry.
    pub fn add_document(&mut self, id: &str, document: &Document, vector: &[f32]) -> Result<()> {
        self.check_dim(vector)?;
        let unit = normalize(vector)
            .ok_or_else(|| Error::DegenerateVector(format!("vector for '{}' has zero or non-finite norm", id)))?;
        let mut stored = document.clone();
        stored.id = Some(id.to_string());
        self.entries.insert(id.to_string(), Entry { vector: unit, document: stored });
        tracing::trace!(doc_id = id, "vector index add");
        Ok(())
    }

    pub fn remove_document(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Top `k` documents by cosine similarity to `query_vec`, ties broken by id.
    ///
    /// A zero query vector matches nothing and returns an empty list.
    pub fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_dim(query_vec)?;
        let Some(query) = normalize(query_vec) else { return Ok(Vec::new()) };
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(&str, f32)> =
            self.entries.iter().map(|(id, entry)| (id.as_str(), dot(&query, &entry.vector))).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .filter_map(|(id, score)| self.entries.get(id).map(|e| SearchHit::vector(id, score, e.document.clone())))
            .collect())
    }

    /// Stored (normalized) vector for a document.
    pub fn vector_for(&self, id: &str) -> Option<&[f32]> {
        self.entries.get(id).map(|e| e.vector.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_dim(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        Ok(())
    }
}

impl VectorIndexer for VectorIndex {
    fn dim(&self) -> usize { self.dim }
    fn add_document(&mut self, id: &str, document: &Document, vector: &[f32]) -> Result<()> { Self::add_document(self, id, document, vector) }
    fn remove_document(&mut self, id: &str) -> bool { Self::remove_document(self, id) }
    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> { Self::search_vec(self, query_vec, k) }
    fn len(&self) -> usize { self.entries.len() }
}

/// Scale `v` to unit length. `None` for zero or non-finite norms.
pub fn normalize(v: &[f32]) -> Option<Vec<f32>> {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    Some(v.iter().map(|x| ((*x as f64) / norm) as f32).collect())
}

/// Cosine similarity of two equal-length vectors; `0.0` when either is zero.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => dot(&a, &b),
        _ => 0.0,
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
