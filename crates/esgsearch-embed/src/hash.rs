use std::hash::Hasher;

use esgsearch_core::traits::TextEmbedder;
use esgsearch_core::Result;
use esgsearch_text::tokenize;
use twox_hash::XxHash64;

/// Feature-hashing embedder.
///
/// Each token is hashed with a seeded XxHash64; the low bits pick a bucket and
/// the high bits give a signed weight. The sum is L2-normalized, so texts that
/// share tokens have positive cosine similarity. Text without tokens embeds to
/// the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    seed: u64,
}

impl HashEmbedder {
    pub fn new(dim: usize, seed: u64) -> Self {
        Self { dim, seed }
    }

    fn token_hash(&self, token: &str) -> u64 {
        let mut hasher = XxHash64::with_seed(self.seed);
        hasher.write(token.as_bytes());
        hasher.finish()
    }
}

impl TextEmbedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn encode_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 {
            return Ok(v);
        }
        for token in tokenize(text) {
            let h = self.token_hash(&token);
            let idx = (h % self.dim as u64) as usize;
            let magnitude = 0.5 + 0.5 * (((h >> 32) as u32) as f32 / u32::MAX as f32);
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            v[idx] += sign * magnitude;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }
}
