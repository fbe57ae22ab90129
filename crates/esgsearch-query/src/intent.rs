use regex::Regex;
use serde::Serialize;

use esgsearch_core::{Error, Result};

/// What the user is trying to achieve with a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    /// Definitions and explanations ("what is net zero")
    Information,
    /// Figures and indicators ("scope 3 metrics")
    Metrics,
    /// Side-by-side evaluation ("tesla vs siemens")
    Comparison,
    /// Change over time
    Trend,
    /// Mandatory rules and disclosure obligations
    Regulation,
    /// Questions about a specific organisation
    Company,
    /// Guidance and best practice
    Recommendation,
}

impl QueryIntent {
    pub const ALL: [QueryIntent; 7] = [
        QueryIntent::Information,
        QueryIntent::Metrics,
        QueryIntent::Comparison,
        QueryIntent::Trend,
        QueryIntent::Regulation,
        QueryIntent::Company,
        QueryIntent::Recommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Information => "information",
            QueryIntent::Metrics => "metrics",
            QueryIntent::Comparison => "comparison",
            QueryIntent::Trend => "trend",
            QueryIntent::Regulation => "regulation",
            QueryIntent::Company => "company",
            QueryIntent::Recommendation => "recommendation",
        }
    }

    /// Word-boundary patterns, matched against the cleaned query.
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            QueryIntent::Information => &[
                r"\bwhat\s+is\b",
                r"\bwhat\s+are\b",
                r"\bdefine\b",
                r"\bdefinition\b",
                r"\bexplain\b",
                r"\bmeaning\s+of\b",
                r"\bhow\s+does\b",
                r"\btell\s+me\s+about\b",
            ],
            QueryIntent::Metrics => &[
                r"\bmetrics?\b",
                r"\bkpis?\b",
                r"\bmeasure(?:s|ment|ments)?\b",
                r"\bdata\b",
                r"\bstatistics?\b",
                r"\bhow\s+much\b",
                r"\bhow\s+many\b",
                r"\bpercent(?:age)?\b",
            ],
            QueryIntent::Comparison => &[
                r"\bcompare\b",
                r"\bcomparison\b",
                r"\bvs\b",
                r"\bversus\b",
                r"\bdifference\s+between\b",
                r"\bbetter\s+than\b",
                r"\bbenchmark(?:s|ing)?\b",
            ],
            QueryIntent::Trend => &[
                r"\btrends?\b",
                r"\bover\s+time\b",
                r"\bhistor(?:y|ical)\b",
                r"\bforecasts?\b",
                r"\bgrowth\b",
                r"\bincreas(?:e|ed|ing)\b",
                r"\bdecreas(?:e|ed|ing)\b",
                r"\bchanges?\s+in\b",
            ],
            QueryIntent::Regulation => &[
                r"\bregulations?\b",
                r"\bregulatory\b",
                r"\bcompliance\b",
                r"\bcomply\b",
                r"\bmandatory\b",
                r"\brequirements?\b",
                r"\blaws?\b",
                r"\bdirective\b",
            ],
            QueryIntent::Company => &[
                r"\bcompan(?:y|ies)\b",
                r"\bcorporat(?:e|ion|ions)\b",
                r"\bfirms?\b",
                r"\bbusiness(?:es)?\b",
                r"\borgani[sz]ations?\b",
                r"\bsector\b",
            ],
            QueryIntent::Recommendation => &[
                r"\bhow\s+to\b",
                r"\bbest\s+practices?\b",
                r"\brecommend(?:s|ed|ation|ations)?\b",
                r"\bshould\b",
                r"\bimprove\b",
                r"\bstrateg(?:y|ies)\b",
                r"\btips\b",
                r"\bsuggest(?:ion|ions)?\b",
            ],
        }
    }

    /// Terms appended to the expanded query when this is the top intent.
    pub fn boosters(&self) -> &'static [&'static str] {
        match self {
            QueryIntent::Metrics => &["KPI", "performance indicators"],
            QueryIntent::Trend => &["trend analysis"],
            QueryIntent::Regulation => &["compliance requirements"],
            QueryIntent::Recommendation => &["best practices"],
            QueryIntent::Information | QueryIntent::Comparison | QueryIntent::Company => &[],
        }
    }

    /// The intent-specific rewording of `query` offered as a variation.
    pub fn phrase(&self, query: &str) -> String {
        match self {
            QueryIntent::Information => format!("explain {}", query),
            QueryIntent::Metrics => format!("metrics for {}", query),
            QueryIntent::Comparison => format!("compare {}", query),
            QueryIntent::Trend => format!("{} trends", query),
            QueryIntent::Regulation => format!("{} regulatory requirements", query),
            QueryIntent::Company => format!("{} sustainability initiatives", query),
            QueryIntent::Recommendation => format!("best practices for {}", query),
        }
    }
}

/// An intent found in a query with its confidence (0..=100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIntent {
    pub intent: QueryIntent,
    pub confidence: u32,
    pub matched_patterns: Vec<String>,
}

/// Confidence contributed by each matching pattern.
pub const CONFIDENCE_PER_MATCH: u32 = 25;

/// Compiled pattern sets, one per intent.
pub struct IntentMatcher {
    sets: Vec<(QueryIntent, Vec<Regex>)>,
}

impl IntentMatcher {
    pub fn new() -> Result<Self> {
        let mut sets = Vec::with_capacity(QueryIntent::ALL.len());
        for intent in QueryIntent::ALL {
            let compiled = intent
                .patterns()
                .iter()
                .map(|p| Regex::new(p).map_err(|e| Error::InvalidPattern(format!("{}: {}", intent.as_str(), e))))
                .collect::<Result<Vec<_>>>()?;
            sets.push((intent, compiled));
        }
        Ok(Self { sets })
    }

    /// Every intent with at least one matching pattern, highest confidence
    /// first. Equal confidences keep declaration order.
    pub fn detect(&self, cleaned: &str) -> Vec<DetectedIntent> {
        let mut found: Vec<DetectedIntent> = self
            .sets
            .iter()
            .filter_map(|(intent, patterns)| {
                let matched: Vec<String> =
                    patterns.iter().filter(|re| re.is_match(cleaned)).map(|re| re.as_str().to_string()).collect();
                if matched.is_empty() {
                    return None;
                }
                Some(DetectedIntent { intent: *intent, confidence: confidence_for(matched.len()), matched_patterns: matched })
            })
            .collect();
        found.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        found
    }
}

pub fn confidence_for(matches: usize) -> u32 {
    (matches as u32).saturating_mul(CONFIDENCE_PER_MATCH).min(100)
}
