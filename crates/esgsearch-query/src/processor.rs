//! Query understanding: clean, extract entities, detect intents, expand and
//! rewrite an incoming query.
//!
//! [`QueryProcessor::process`] is a pure function of the query and the
//! knowledge base it was built with.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use esgsearch_core::{Error, Result};
use esgsearch_text::tokenize;

use crate::intent::{DetectedIntent, IntentMatcher};
use crate::knowledge::KnowledgeBase;

pub const MAX_VARIATIONS: usize = 5;
pub const MAX_RELATED_PER_CONCEPT: usize = 2;
/// Key metric placeholder that carries no searchable meaning.
pub const NON_SPECIFIC_METRIC: &str = "Varies by industry";

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on",
    "that", "the", "to", "was", "will", "with", "or", "but", "not", "this", "these", "they", "them", "their", "there",
    "then", "than", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could",
    "should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMatch {
    pub name: String,
    pub category: String,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMatch {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkMatch {
    pub id: String,
    pub focus: String,
    pub matched_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub concepts: Vec<ConceptMatch>,
    pub companies: Vec<CompanyMatch>,
    pub frameworks: Vec<FrameworkMatch>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty() && self.companies.is_empty() && self.frameworks.is_empty()
    }
}

/// Everything derived from one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedQuery {
    pub original: String,
    pub cleaned: String,
    /// Cleaned tokens minus stop words, first occurrence order.
    pub keywords: Vec<String>,
    /// Cleaned query followed by the expansion terms.
    pub expanded: String,
    pub expansion_terms: Vec<String>,
    pub entities: Entities,
    /// Highest confidence first.
    pub intents: Vec<DetectedIntent>,
    pub variations: Vec<String>,
}

impl ProcessedQuery {
    pub fn top_intent(&self) -> Option<&DetectedIntent> {
        self.intents.first()
    }

    /// Text to retrieve with: the expanded query, or the cleaned one when
    /// expansion produced nothing.
    pub fn search_text(&self) -> &str {
        if self.expanded.trim().is_empty() { &self.cleaned } else { &self.expanded }
    }
}

/// Lowercase, drop characters other than word characters, whitespace and
/// `- . , ?`, then collapse runs of whitespace. Idempotent.
pub fn clean_query(query: &str) -> String {
    let kept: String = query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace() || matches!(c, '-' | '.' | ',' | '?'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-stop-word tokens of an already cleaned query.
pub fn extract_keywords(cleaned: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(cleaned)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

struct SynonymRule {
    pattern: Regex,
    synonyms: Vec<String>,
}

pub struct QueryProcessor {
    kb: Arc<KnowledgeBase>,
    intents: IntentMatcher,
    synonym_rules: Vec<SynonymRule>,
}

impl QueryProcessor {
    /// Compile intent patterns and generic-synonym matchers for `kb`.
    pub fn new(kb: Arc<KnowledgeBase>) -> Result<Self> {
        let intents = IntentMatcher::new()?;
        let mut synonym_rules = Vec::with_capacity(kb.synonyms.len());
        for entry in &kb.synonyms {
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&entry.term.to_lowercase())))
                .map_err(|e| Error::InvalidPattern(format!("synonym '{}': {}", entry.term, e)))?;
            synonym_rules.push(SynonymRule {
                pattern,
                synonyms: entry.synonyms.iter().map(|s| s.to_lowercase()).collect(),
            });
        }
        Ok(Self { kb, intents, synonym_rules })
    }

    /// Processor over the compiled-in knowledge base.
    pub fn builtin() -> Result<Self> {
        Self::new(Arc::new(KnowledgeBase::builtin()))
    }

    pub fn process(&self, query: &str) -> ProcessedQuery {
        let cleaned = clean_query(query);
        let keywords = extract_keywords(&cleaned);
        let entities = self.extract_entities(&cleaned);
        let intents = self.intents.detect(&cleaned);
        let expansion_terms = self.expansion_terms(&entities, &intents);
        let expanded = if expansion_terms.is_empty() || cleaned.is_empty() {
            cleaned.clone()
        } else {
            format!("{} {}", cleaned, expansion_terms.join(" "))
        };
        let variations = self.variations(&cleaned, &entities, &intents);

        tracing::debug!(
            query = %cleaned,
            concepts = entities.concepts.len(),
            companies = entities.companies.len(),
            frameworks = entities.frameworks.len(),
            intents = intents.len(),
            variations = variations.len(),
            "processed query"
        );

        ProcessedQuery {
            original: query.to_string(),
            cleaned,
            keywords,
            expanded,
            expansion_terms,
            entities,
            intents,
            variations,
        }
    }

    /// Substring matches of concepts, companies and frameworks. For each entry
    /// the first matching surface form wins.
    pub fn extract_entities(&self, cleaned: &str) -> Entities {
        let mut entities = Entities::default();
        if cleaned.is_empty() {
            return entities;
        }

        for concept in &self.kb.concepts {
            let forms = std::iter::once(&concept.name).chain(concept.synonyms.iter());
            if let Some(matched) = first_match(cleaned, forms) {
                entities.concepts.push(ConceptMatch {
                    name: concept.name.clone(),
                    category: concept.category.clone(),
                    matched_text: matched,
                });
            }
        }

        for company in &self.kb.companies {
            let forms = std::iter::once(&company.name).chain(company.aliases.iter());
            if let Some(matched) = first_match(cleaned, forms) {
                entities.companies.push(CompanyMatch {
                    id: company.id.clone(),
                    name: company.name.clone(),
                    sector: company.sector.clone(),
                    matched_text: matched,
                });
            }
        }

        for framework in &self.kb.frameworks {
            let forms = [&framework.id, &framework.full_name].into_iter().chain(framework.aliases.iter());
            if let Some(matched) = first_match(cleaned, forms) {
                entities.frameworks.push(FrameworkMatch {
                    id: framework.id.clone(),
                    focus: framework.focus.clone(),
                    matched_text: matched,
                });
            }
        }

        entities
    }

    fn expansion_terms(&self, entities: &Entities, intents: &[DetectedIntent]) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |term: &str| {
            if !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        };

        for matched in &entities.concepts {
            if let Some(concept) = self.kb.concept(&matched.name) {
                for related in concept.related.iter().take(MAX_RELATED_PER_CONCEPT) {
                    push(related.as_str());
                }
            }
        }

        if let Some(company) = entities.companies.first().and_then(|m| self.kb.company(&m.id)) {
            if let Some(initiative) = company.initiatives.first() {
                push(initiative.as_str());
            }
        }

        if let Some(framework) = entities.frameworks.first().and_then(|m| self.kb.framework(&m.id)) {
            if let Some(metric) = framework.key_metrics.iter().find(|m| m.as_str() != NON_SPECIFIC_METRIC) {
                push(metric.as_str());
            }
        }

        if let Some(top) = intents.first() {
            for booster in top.intent.boosters() {
                push(*booster);
            }
        }

        terms
    }

    fn variations(&self, cleaned: &str, entities: &Entities, intents: &[DetectedIntent]) -> Vec<String> {
        if cleaned.is_empty() {
            return Vec::new();
        }
        let mut candidates: Vec<String> = Vec::new();

        for rule in &self.synonym_rules {
            if !rule.pattern.is_match(cleaned) {
                continue;
            }
            for synonym in &rule.synonyms {
                candidates.push(rule.pattern.replace_all(cleaned, regex::NoExpand(synonym)).into_owned());
            }
        }

        for matched in &entities.concepts {
            if let Some(concept) = self.kb.concept(&matched.name) {
                for alternative in concept.synonyms.iter().chain(std::iter::once(&concept.name)) {
                    let alternative = alternative.to_lowercase();
                    if alternative != matched.matched_text {
                        candidates.push(cleaned.replace(&matched.matched_text, &alternative));
                    }
                }
            }
        }

        for matched in &entities.frameworks {
            if let Some(framework) = self.kb.framework(&matched.id) {
                for alias in &framework.aliases {
                    let alias = alias.to_lowercase();
                    if alias != matched.matched_text {
                        candidates.push(cleaned.replace(&matched.matched_text, &alias));
                    }
                }
            }
        }

        if let Some(top) = intents.first() {
            candidates.push(top.intent.phrase(cleaned));
        }

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|v| v != cleaned)
            .filter(|v| seen.insert(v.clone()))
            .take(MAX_VARIATIONS)
            .collect()
    }
}

fn first_match<'a>(cleaned: &str, forms: impl Iterator<Item = &'a String>) -> Option<String> {
    forms.map(|f| f.to_lowercase()).find(|f| !f.is_empty() && cleaned.contains(f.as_str()))
}
