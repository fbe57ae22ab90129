use std::time::Duration;

use esgsearch_core::config::{EmbeddingProvider, EmbeddingSettings};
use esgsearch_core::traits::TextEmbedder;
use esgsearch_core::Error;
use esgsearch_embed::remote::{parse_ollama_response, parse_openai_response};
use esgsearch_embed::{build_embedder, HashEmbedder, RemoteEmbedder, RemoteProvider};

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(768, 0);
    let texts = vec!["carbon emissions report".to_string(), "carbon emissions report".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let (v1, v2) = (&embs[0], &embs[1]);

    assert_eq!(v1.len(), 768);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn hash_embedder_relates_texts_sharing_tokens() {
    let embedder = HashEmbedder::new(256, 0);
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let q = embedder.encode_text("renewable energy").unwrap();
    let near = embedder.encode_text("renewable energy targets").unwrap();
    let same = embedder.encode_text("Renewable, ENERGY!").unwrap();
    assert!(dot(&q, &near) > 0.5);
    assert!((dot(&q, &same) - 1.0).abs() < 1e-5, "case and punctuation do not matter");
}

#[test]
fn build_embedder_honours_provider_and_dim() {
    let settings = EmbeddingSettings { dim: 16, ..EmbeddingSettings::default() };
    let embedder = build_embedder(&settings).expect("hash embedder");
    assert_eq!(embedder.name(), "hash");
    assert_eq!(embedder.dim(), 16);
    assert_eq!(embedder.encode_text("water").unwrap().len(), 16);

    let remote = EmbeddingSettings { provider: EmbeddingProvider::Ollama, ..EmbeddingSettings::default() };
    let embedder = build_embedder(&remote).expect("remote embedder builds without contacting the server");
    assert_eq!(embedder.name(), "ollama:nomic-embed-text");
}

#[test]
fn unreachable_server_reports_embedder_unavailable() {
    let embedder = RemoteEmbedder::new(
        RemoteProvider::Ollama,
        "http://127.0.0.1:1",
        "nomic-embed-text",
        8,
        None,
        Duration::from_millis(500),
    )
    .expect("client");
    assert_eq!(embedder.url(), "http://127.0.0.1:1/api/embed");
    let err = embedder.encode_text("scope 3").unwrap_err();
    assert!(matches!(err, Error::EmbedderUnavailable(_)), "got {err:?}");
    assert!(err.is_embedding_failure());
}

#[test]
fn empty_batch_needs_no_server() {
    let embedder =
        RemoteEmbedder::new(RemoteProvider::OpenAi, "http://127.0.0.1:1", "m", 8, Some("k".into()), Duration::from_millis(100))
            .unwrap();
    assert!(embedder.embed_batch(&[]).unwrap().is_empty());
}

#[test]
fn parses_provider_responses() {
    let ollama = parse_ollama_response(r#"{"model":"m","embeddings":[[0.1,0.2],[0.3,0.4]]}"#).unwrap();
    assert_eq!(ollama, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);

    let openai = parse_openai_response(r#"{"object":"list","data":[{"index":0,"embedding":[1.0,0.0]}],"model":"m"}"#).unwrap();
    assert_eq!(openai, vec![vec![1.0, 0.0]]);

    assert!(parse_ollama_response(r#"{"error":"model not found"}"#).is_err());
}
