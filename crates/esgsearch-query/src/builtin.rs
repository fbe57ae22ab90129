//! Compiled-in vocabulary for [`KnowledgeBase::builtin`](crate::KnowledgeBase::builtin).
//!
//! Entries are matched as lowercase substrings of the cleaned query, so short
//! synonyms and aliases are kept distinctive.

use crate::knowledge::{CompanyDefinition, ConceptDefinition, FrameworkDefinition, GenericSynonym};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn concept(name: &str, category: &str, synonyms: &[&str], related: &[&str], frameworks: &[&str]) -> ConceptDefinition {
    ConceptDefinition {
        name: name.to_string(),
        category: category.to_string(),
        synonyms: strings(synonyms),
        related: strings(related),
        frameworks: strings(frameworks),
    }
}

fn framework(id: &str, full_name: &str, focus: &str, key_metrics: &[&str], aliases: &[&str]) -> FrameworkDefinition {
    FrameworkDefinition {
        id: id.to_string(),
        full_name: full_name.to_string(),
        focus: focus.to_string(),
        key_metrics: strings(key_metrics),
        aliases: strings(aliases),
    }
}

fn company(id: &str, name: &str, sector: &str, ticker: Option<&str>, initiatives: &[&str], aliases: &[&str]) -> CompanyDefinition {
    CompanyDefinition {
        id: id.to_string(),
        name: name.to_string(),
        sector: sector.to_string(),
        ticker: ticker.map(str::to_string),
        initiatives: strings(initiatives),
        aliases: strings(aliases),
    }
}

pub(crate) fn concepts() -> Vec<ConceptDefinition> {
    vec![
        concept(
            "carbon emissions",
            "climate",
            &["carbon footprint", "ghg emissions", "greenhouse gas emissions", "co2 emissions"],
            &["scope 1", "scope 2", "scope 3", "net zero"],
            &["GHG Protocol", "TCFD", "CDP"],
        ),
        concept(
            "net zero",
            "climate",
            &["net-zero", "carbon neutral", "climate neutral"],
            &["science based targets", "carbon offsets", "decarbonization"],
            &["SBTi"],
        ),
        concept(
            "climate risk",
            "climate",
            &["climate-related risk", "physical risk", "transition risk"],
            &["scenario analysis", "stranded assets"],
            &["TCFD", "ISSB"],
        ),
        concept(
            "renewable energy",
            "energy",
            &["clean energy", "green energy", "solar power", "wind power"],
            &["energy transition", "power purchase agreements", "energy efficiency"],
            &["GRI", "CDP"],
        ),
        concept(
            "energy efficiency",
            "energy",
            &["energy savings", "energy consumption"],
            &["energy intensity", "renewable energy"],
            &["GRI"],
        ),
        concept(
            "water management",
            "environment",
            &["water stewardship", "water usage", "water consumption", "water conservation"],
            &["water risk", "wastewater treatment"],
            &["CDP", "GRI"],
        ),
        concept(
            "waste management",
            "environment",
            &["circular economy", "recycling", "waste reduction", "zero waste"],
            &["circularity", "landfill diversion"],
            &["GRI"],
        ),
        concept(
            "biodiversity",
            "environment",
            &["nature conservation", "ecosystem protection", "deforestation"],
            &["land use", "nature-related risks"],
            &["GRI"],
        ),
        concept(
            "diversity and inclusion",
            "social",
            &["diversity equity and inclusion", "workforce diversity", "gender diversity"],
            &["pay equity", "board diversity"],
            &["GRI"],
        ),
        concept(
            "human rights",
            "social",
            &["labor rights", "labour rights", "modern slavery"],
            &["due diligence", "fair wages"],
            &["GRI"],
        ),
        concept(
            "employee wellbeing",
            "social",
            &["health and safety", "occupational safety", "worker safety"],
            &["employee engagement", "training hours"],
            &["GRI", "SASB"],
        ),
        concept(
            "corporate governance",
            "governance",
            &["board oversight", "executive compensation", "board independence"],
            &["shareholder rights", "business ethics"],
            &["SASB", "ISSB"],
        ),
        concept(
            "sustainable finance",
            "finance",
            &["green bonds", "esg investing", "responsible investment", "impact investing"],
            &["sustainability-linked loans", "taxonomy alignment"],
            &["SFDR", "EU Taxonomy"],
        ),
        concept(
            "supply chain sustainability",
            "supply chain",
            &["responsible sourcing", "supplier engagement", "sustainable procurement"],
            &["scope 3", "supplier audits"],
            &["CDP", "GRI"],
        ),
    ]
}

pub(crate) fn frameworks() -> Vec<FrameworkDefinition> {
    vec![
        framework(
            "CSRD",
            "Corporate Sustainability Reporting Directive",
            "mandatory EU sustainability reporting",
            &["double materiality assessment", "ESRS disclosures"],
            &["esrs", "european sustainability reporting standards"],
        ),
        framework(
            "TCFD",
            "Task Force on Climate-related Financial Disclosures",
            "climate-related financial risk",
            &["climate scenario analysis", "climate risk metrics"],
            &["climate-related financial disclosures"],
        ),
        framework(
            "GRI",
            "Global Reporting Initiative",
            "impact reporting",
            &["GRI 305 emissions", "GRI 303 water"],
            &["gri standards", "global reporting standards"],
        ),
        framework(
            "SASB",
            "Sustainability Accounting Standards Board",
            "financially material sustainability topics",
            &["Varies by industry", "industry-specific metrics"],
            &["sasb standards"],
        ),
        framework(
            "CDP",
            "Carbon Disclosure Project",
            "environmental disclosure",
            &["climate change score", "water security score"],
            &["carbon disclosure"],
        ),
        framework(
            "ISSB",
            "International Sustainability Standards Board",
            "investor-focused sustainability disclosure",
            &["IFRS S1 general requirements", "IFRS S2 climate disclosures"],
            &["ifrs s1", "ifrs s2", "ifrs sustainability"],
        ),
        framework(
            "SFDR",
            "Sustainable Finance Disclosure Regulation",
            "sustainable investment disclosure",
            &["principal adverse impacts", "article 8 and 9 classification"],
            &["article 8 fund", "article 9 fund"],
        ),
        framework(
            "EU Taxonomy",
            "EU Taxonomy Regulation",
            "classification of environmentally sustainable activities",
            &["taxonomy-aligned revenue", "taxonomy-aligned capex"],
            &["green taxonomy", "taxonomy regulation"],
        ),
        framework(
            "GHG Protocol",
            "Greenhouse Gas Protocol",
            "greenhouse gas accounting",
            &["scope 1 emissions", "scope 2 emissions", "scope 3 emissions"],
            &["ghg accounting", "ghg protocol standards"],
        ),
        framework(
            "SBTi",
            "Science Based Targets initiative",
            "emissions reduction targets",
            &["validated near-term targets", "net-zero target validation"],
            &["science-based targets"],
        ),
    ]
}

pub(crate) fn companies() -> Vec<CompanyDefinition> {
    vec![
        company("microsoft", "Microsoft", "technology", Some("MSFT"), &["carbon negative by 2030", "climate innovation fund"], &["msft"]),
        company("apple", "Apple", "technology", Some("AAPL"), &["carbon neutral products by 2030", "recycled materials"], &["aapl"]),
        company("alphabet", "Alphabet", "technology", Some("GOOGL"), &["24/7 carbon-free energy", "water replenishment"], &["google"]),
        company("unilever", "Unilever", "consumer goods", Some("ULVR"), &["sustainable living plan", "regenerative agriculture"], &[]),
        company("patagonia", "Patagonia", "apparel", None, &["1% for the planet", "worn wear repairs"], &[]),
        company("tesla", "Tesla", "automotive", Some("TSLA"), &["electric vehicle adoption", "battery recycling"], &["tsla"]),
        company("orsted", "Ørsted", "energy", Some("ORSTED"), &["offshore wind buildout", "coal phase-out"], &["orsted"]),
        company("nestle", "Nestlé", "food and beverage", Some("NESN"), &["regenerative agriculture", "plastic packaging reduction"], &["nestle"]),
        company("siemens", "Siemens", "industrials", Some("SIE"), &["degree framework", "decarbonized operations"], &[]),
        company("ikea", "IKEA", "retail", None, &["circular products", "renewable energy investments"], &["ingka"]),
    ]
}

pub(crate) fn generic_synonyms() -> Vec<GenericSynonym> {
    let entry = |term: &str, synonyms: &[&str]| GenericSynonym { term: term.to_string(), synonyms: strings(synonyms) };
    vec![
        entry("sustainability", &["esg", "corporate responsibility"]),
        entry("emissions", &["ghg", "greenhouse gases"]),
        entry("report", &["disclosure", "filing"]),
        entry("reporting", &["disclosure"]),
        entry("company", &["firm", "corporation"]),
        entry("companies", &["firms", "corporations"]),
        entry("target", &["goal", "commitment"]),
        entry("targets", &["goals", "commitments"]),
        entry("reduce", &["cut", "lower"]),
        entry("reduction", &["decrease", "cut"]),
        entry("renewable", &["clean", "green"]),
        entry("energy", &["power"]),
        entry("environmental", &["ecological", "green"]),
        entry("governance", &["oversight"]),
        entry("diversity", &["inclusion"]),
        entry("impact", &["effect"]),
    ]
}
