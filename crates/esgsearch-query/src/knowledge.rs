//! Read-only domain knowledge used by query understanding.
//!
//! A [`KnowledgeBase`] is built once (from the compiled-in tables or from an
//! operator-supplied JSON file) and shared behind an `Arc`. Nothing mutates it
//! after construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use esgsearch_core::{Error, Result};

use crate::builtin;

/// A sustainability concept and the ways people refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptDefinition {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Terms appended during query expansion.
    #[serde(default)]
    pub related: Vec<String>,
    /// Identifiers of frameworks that cover the concept.
    #[serde(default)]
    pub frameworks: Vec<String>,
}

/// An ESG reporting framework or standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameworkDefinition {
    pub id: String,
    pub full_name: String,
    pub focus: String,
    #[serde(default)]
    pub key_metrics: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyDefinition {
    pub id: String,
    pub name: String,
    pub sector: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub initiatives: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A general-vocabulary word and interchangeable alternatives, used to
/// generate query variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericSynonym {
    pub term: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub concepts: Vec<ConceptDefinition>,
    #[serde(default)]
    pub frameworks: Vec<FrameworkDefinition>,
    #[serde(default)]
    pub companies: Vec<CompanyDefinition>,
    #[serde(default)]
    pub synonyms: Vec<GenericSynonym>,
}

impl KnowledgeBase {
    /// The compiled-in sustainability vocabulary.
    pub fn builtin() -> Self {
        Self {
            concepts: builtin::concepts(),
            frameworks: builtin::frameworks(),
            companies: builtin::companies(),
            synonyms: builtin::generic_synonyms(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let kb: Self = serde_json::from_str(json)?;
        kb.validate()?;
        Ok(kb)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let kb = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::info!(
            path = %path.display(),
            concepts = kb.concepts.len(),
            frameworks = kb.frameworks.len(),
            companies = kb.companies.len(),
            "loaded knowledge base"
        );
        Ok(kb)
    }

    pub fn concept(&self, name: &str) -> Option<&ConceptDefinition> {
        self.concepts.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn framework(&self, id: &str) -> Option<&FrameworkDefinition> {
        self.frameworks.iter().find(|f| f.id.eq_ignore_ascii_case(id))
    }

    pub fn company(&self, id: &str) -> Option<&CompanyDefinition> {
        self.companies.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    fn validate(&self) -> Result<()> {
        let blank = |s: &str| s.trim().is_empty();
        if let Some(c) = self.concepts.iter().find(|c| blank(&c.name)) {
            return Err(Error::InvalidConfig(format!("concept with empty name (category '{}')", c.category)));
        }
        if self.frameworks.iter().any(|f| blank(&f.id)) {
            return Err(Error::InvalidConfig("framework with empty id".to_string()));
        }
        if self.companies.iter().any(|c| blank(&c.id) || blank(&c.name)) {
            return Err(Error::InvalidConfig("company with empty id or name".to_string()));
        }
        if self.synonyms.iter().any(|s| blank(&s.term)) {
            return Err(Error::InvalidConfig("synonym entry with empty term".to_string()));
        }
        Ok(())
    }
}
