//! Blocking HTTP embedders.
//!
//! Ollama: `POST {base_url}/api/embed` with `{model, input, truncate}` returning
//! `{embeddings}`. OpenAI-compatible: `POST {base_url}/v1/embeddings` with
//! `{model, input}` returning `{data: [{embedding}]}`. Every transport, status
//! or decoding failure surfaces as [`Error::EmbedderUnavailable`].

use std::time::Duration;

use esgsearch_core::config::EmbeddingSettings;
use esgsearch_core::traits::TextEmbedder;
use esgsearch_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Inputs longer than this are cut on a char boundary before sending.
const MAX_EMBED_CHARS: usize = 3_000;
const OLLAMA_BATCH: usize = 32;
const OPENAI_BATCH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProvider {
    Ollama,
    OpenAi,
}

impl RemoteProvider {
    fn endpoint(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            RemoteProvider::Ollama => format!("{}/api/embed", base),
            RemoteProvider::OpenAi => format!("{}/v1/embeddings", base),
        }
    }

    fn batch_size(&self) -> usize {
        match self {
            RemoteProvider::Ollama => OLLAMA_BATCH,
            RemoteProvider::OpenAi => OPENAI_BATCH,
        }
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

pub struct RemoteEmbedder {
    provider: RemoteProvider,
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
    name: String,
}

impl RemoteEmbedder {
    pub fn new(
        provider: RemoteProvider,
        base_url: &str,
        model: &str,
        dim: usize,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {}", e)))?;
        let name = match provider {
            RemoteProvider::Ollama => format!("ollama:{}", model),
            RemoteProvider::OpenAi => format!("openai:{}", model),
        };
        Ok(Self {
            provider,
            client,
            url: provider.endpoint(base_url),
            model: model.to_string(),
            api_key,
            dim,
            name,
        })
    }

    pub fn from_settings(provider: RemoteProvider, settings: &EmbeddingSettings) -> Result<Self> {
        Self::new(
            provider,
            &settings.base_url,
            &settings.model,
            settings.dim,
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> Error {
        Error::EmbedderUnavailable(format!("{}: {}", self.name, reason))
    }

    fn post_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = match self.provider {
            RemoteProvider::Ollama => self
                .client
                .post(&self.url)
                .json(&OllamaEmbedRequest { model: &self.model, input: chunk, truncate: true }),
            RemoteProvider::OpenAi => {
                let req = self.client.post(&self.url).json(&OpenAiEmbedRequest { model: &self.model, input: chunk });
                match self.api_key.as_deref() {
                    Some(key) => req.bearer_auth(key),
                    None => req,
                }
            }
        };

        let resp = request.send().map_err(|e| self.unavailable(e))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| self.unavailable(e))?;
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}: {}", status, body)));
        }
        let vectors = match self.provider {
            RemoteProvider::Ollama => parse_ollama_response(&body),
            RemoteProvider::OpenAi => parse_openai_response(&body),
        }
        .map_err(|e| self.unavailable(e))?;

        if vectors.len() != chunk.len() {
            return Err(self.unavailable(format!("expected {} embeddings, got {}", chunk.len(), vectors.len())));
        }
        Ok(vectors)
    }
}

impl TextEmbedder for RemoteEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn encode_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| self.unavailable("no embedding returned"))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let truncated: Vec<String> = texts.iter().map(|t| truncate_for_embedding(t).to_string()).collect();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in truncated.chunks(self.provider.batch_size()) {
            tracing::debug!(embedder = %self.name, n = chunk.len(), "remote embed");
            for vector in self.post_chunk(chunk)? {
                if vector.len() != self.dim {
                    return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
                }
                out.push(vector);
            }
        }
        Ok(out)
    }
}

/// Cut `text` to at most [`MAX_EMBED_CHARS`] bytes on a char boundary.
pub fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub fn parse_ollama_response(body: &str) -> std::result::Result<Vec<Vec<f32>>, serde_json::Error> {
    serde_json::from_str::<OllamaEmbedResponse>(body).map(|r| r.embeddings)
}

pub fn parse_openai_response(body: &str) -> std::result::Result<Vec<Vec<f32>>, serde_json::Error> {
    serde_json::from_str::<OpenAiEmbedResponse>(body).map(|r| r.data.into_iter().map(|d| d.embedding).collect())
}
