pub mod index;

pub use index::{cosine, normalize, VectorIndex};
