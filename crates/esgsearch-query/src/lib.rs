mod builtin;
pub mod intent;
pub mod knowledge;
pub mod processor;

pub use intent::{DetectedIntent, IntentMatcher, QueryIntent};
pub use knowledge::{CompanyDefinition, ConceptDefinition, FrameworkDefinition, GenericSynonym, KnowledgeBase};
pub use processor::{clean_query, extract_keywords, Entities, ProcessedQuery, QueryProcessor};
