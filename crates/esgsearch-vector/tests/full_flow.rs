use esgsearch_core::traits::{TextEmbedder, VectorIndexer};
use esgsearch_core::types::{Document, SourceKind};
use esgsearch_core::Error;
use esgsearch_embed::HashEmbedder;
use esgsearch_vector::VectorIndex;

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[test]
fn stored_vectors_are_unit_length() {
    let mut index = VectorIndex::new(3);
    index.add_document("a", &Document::new("A", "", ""), &[10.0, 0.0, 5.0]).expect("add");
    let stored = index.vector_for("a").expect("stored");
    assert!((norm(stored) - 1.0).abs() < 1e-5, "norm={}", norm(stored));
}

#[test]
fn ranks_by_cosine_similarity() {
    let mut index = VectorIndex::new(2);
    index.add_document("east", &Document::new("east", "", ""), &[1.0, 0.0]).unwrap();
    index.add_document("north", &Document::new("north", "", ""), &[0.0, 1.0]).unwrap();
    index.add_document("northeast", &Document::new("ne", "", ""), &[1.0, 1.0]).unwrap();

    let hits = index.search_vec(&[2.0, 0.1], 3).expect("search");
    let ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["east", "northeast", "north"]);
    assert!(hits.iter().all(|h| h.source == SourceKind::Vector));
    assert!(hits.iter().all(|h| h.keyword_score == 0.0 && h.vector_score == h.score));
    assert!(hits[0].score <= 1.0 + 1e-6);
    assert_eq!(hits[0].document.id.as_deref(), Some("east"));
}

#[test]
fn equal_similarity_breaks_ties_by_id() {
    let mut index = VectorIndex::new(2);
    index.add_document("b", &Document::default(), &[1.0, 0.0]).unwrap();
    index.add_document("a", &Document::default(), &[2.0, 0.0]).unwrap();
    let hits = index.search_vec(&[1.0, 0.0], 2).unwrap();
    assert_eq!(hits.iter().map(|h| h.doc_id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn empty_index_and_zero_query_return_nothing() {
    let mut index = VectorIndex::new(2);
    assert!(index.is_empty());
    assert!(index.search_vec(&[1.0, 0.0], 5).unwrap().is_empty());

    index.add_document("a", &Document::default(), &[1.0, 0.0]).unwrap();
    assert!(index.search_vec(&[0.0, 0.0], 5).unwrap().is_empty());
    assert!(index.search_vec(&[1.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn dimension_mismatch_is_an_error() {
    let mut index = VectorIndex::new(3);
    let err = index.add_document("a", &Document::default(), &[1.0, 0.0]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
    let err = index.search_vec(&[1.0; 4], 1).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 4 }));
    assert!(index.is_empty());
}

#[test]
fn degenerate_vectors_are_rejected() {
    let mut index = VectorIndex::new(2);
    assert!(matches!(index.add_document("z", &Document::default(), &[0.0, 0.0]), Err(Error::DegenerateVector(_))));
    assert!(matches!(index.add_document("n", &Document::default(), &[f32::NAN, 1.0]), Err(Error::DegenerateVector(_))));
    assert_eq!(index.len(), 0);
}

#[test]
fn re_adding_an_id_overwrites() {
    let mut index = VectorIndex::new(2);
    index.add_document("a", &Document::new("old", "", ""), &[1.0, 0.0]).unwrap();
    index.add_document("a", &Document::new("new", "", ""), &[0.0, 1.0]).unwrap();
    assert_eq!(index.len(), 1);
    let hits = index.search_vec(&[0.0, 1.0], 1).unwrap();
    assert_eq!(hits[0].document.title, "new");
    assert!((hits[0].score - 1.0).abs() < 1e-5);
    assert!(index.remove_document("a"));
    assert!(!index.contains("a"));
}

#[test]
fn hash_embeddings_find_their_own_document() {
    let embedder = HashEmbedder::new(64, 7);
    let mut index = VectorIndex::new(embedder.dim());
    let texts = [
        ("water", "water stewardship and consumption targets"),
        ("carbon", "carbon emissions scope reporting"),
        ("people", "employee wellbeing and diversity"),
    ];
    for (id, text) in texts {
        let v = embedder.encode_text(text).unwrap();
        VectorIndexer::add_document(&mut index, id, &Document::new("", "", text), &v).unwrap();
    }
    let q = embedder.encode_text("carbon emissions scope reporting").unwrap();
    let hits = VectorIndexer::search_vec(&index, &q, 3).unwrap();
    assert_eq!(hits[0].doc_id, "carbon");
    assert!((hits[0].score - 1.0).abs() < 1e-4);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
