//! # Field Normalization
//!
//! Upstream records are JSON-LD with no fixed schema. A single field may arrive as:
//! - a plain string or URI: `"http://data.food.gov.uk/food-alerts/def/alert-type/AA"`
//! - a list of either form: `[{"notation": "GB-SCT"}, ...]`
//! - a node: `{"@id": ..., "label": ..., "notation": ...}`
//!
//! [`Term`] captures those shapes once, on receipt. Every function below has a fallback
//! so display code never fails on an odd record.
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const DEFAULT_DESCRIPTION: &str = "No description available.";

const DESCRIPTION_FIELDS: [&str; 2] = ["problemStatement", "description"];
const LATE_DESCRIPTION_FIELD: &str = "textDescription";

const COUNTRY_NAMES: [(&str, &str); 8] = [
    ("GB-SCT", "Scotland"),
    ("GB-ENG", "England"),
    ("GB-WLS", "Wales"),
    ("GB-NIR", "N. Ireland"),
    ("SCT", "Scotland"),
    ("ENG", "England"),
    ("WLS", "Wales"),
    ("NIR", "N. Ireland"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Term {
    Text(String),
    List(Vec<Term>),
    Node {
        id: Option<String>,
        label: Option<String>,
        notation: Option<String>,
    },
    #[default]
    Absent,
}

impl From<&Value> for Term {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Term::Text(s.clone()),
            Value::Array(items) => Term::List(items.iter().map(Term::from).collect()),
            Value::Object(map) => Term::Node {
                id: map.get("@id").and_then(text),
                label: map
                    .get("label")
                    .or_else(|| map.get("prefLabel"))
                    .and_then(text),
                notation: map.get("notation").and_then(text),
            },
            _ => Term::Absent,
        }
    }
}

impl From<Option<&Value>> for Term {
    fn from(value: Option<&Value>) -> Self {
        value.map_or(Term::Absent, Term::from)
    }
}

impl Term {
    /// The string the term stands for, picking the first list element and preferring a
    /// node's `@id`, then `label`, then `notation`.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Term::Text(s) => Some(s.as_str()),
            Term::List(items) => items.first().and_then(Term::primary),
            Term::Node {
                id,
                label,
                notation,
            } => id.as_deref().or(label.as_deref()).or(notation.as_deref()),
            Term::Absent => None,
        }
    }

    fn elements(&self) -> &[Term] {
        match self {
            Term::List(items) => items.as_slice(),
            Term::Absent => &[],
            single => std::slice::from_ref(single),
        }
    }

    fn country_code(&self) -> Option<String> {
        match self {
            Term::Text(s) => Some(last_segment(s).to_string()),
            Term::Node {
                label, notation, ..
            } => notation.clone().or_else(|| label.clone()),
            Term::List(_) | Term::Absent => None,
        }
    }
}

/// Plain text from a string, a `{"@value": ..}` literal, or the first such entry of a list.
pub fn text(value: &Value) -> Option<String> {
    let found = match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("@value").and_then(text),
        Value::Array(items) => items.iter().find_map(text),
        _ => None,
    };

    found.filter(|s| !s.is_empty())
}

fn last_segment(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlertKind {
    Allergy,
    Recall,
    Action,
    Other(String),
    #[default]
    Unknown,
}

impl AlertKind {
    pub fn classify(term: &Term) -> Self {
        let Some(raw) = term.primary().filter(|s| !s.is_empty()) else {
            return AlertKind::Unknown;
        };

        let lower = raw.to_lowercase();
        let matches = |fragments: [&str; 2]| fragments.iter().any(|f| lower.contains(f));

        if matches(["allergy", "aa"]) {
            AlertKind::Allergy
        } else if matches(["recall", "prin"]) {
            AlertKind::Recall
        } else if matches(["action", "fafa"]) {
            AlertKind::Action
        } else {
            match last_segment(raw) {
                "" => AlertKind::Unknown,
                segment => AlertKind::Other(segment.to_string()),
            }
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AlertKind::Allergy => "Allergy Alert",
            AlertKind::Recall => "Product Recall",
            AlertKind::Action => "Food Alert",
            AlertKind::Other(label) => label.as_str(),
            AlertKind::Unknown => "Alert",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Country codes from `country` then `notifyingCountry`, deduplicated in first-seen order.
pub fn country_codes(country: &Term, notifying_country: &Term) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();

    for term in country.elements().iter().chain(notifying_country.elements()) {
        if let Some(code) = term.country_code().filter(|c| !c.is_empty()) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }

    codes
}

pub fn country_label(code: &str) -> &str {
    COUNTRY_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(code, |(_, name)| *name)
}

pub fn description(record: &Value) -> String {
    let field = |name: &str| record.get(name).and_then(text);

    DESCRIPTION_FIELDS
        .into_iter()
        .find_map(field)
        .or_else(|| match record.get("problem") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(problem @ Value::Object(_)) => problem.get("description").and_then(text),
            _ => None,
        })
        .or_else(|| field(LATE_DESCRIPTION_FIELD))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

/// Renders `D MMM YYYY`, or hands the input back untouched when it is not a date.
pub fn format_date(raw: &str) -> String {
    parse_date(raw.trim())
        .map(|date| date.format("%-d %b %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|d| d.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
