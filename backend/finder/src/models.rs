use std::fmt;

use serde_json::Value;

use crate::normalize::{
    AlertKind, Term, country_codes, country_label, description, format_date, text,
};

pub const UNTITLED: &str = "Untitled Alert";

/// An upstream alert decoded into the one shape the rest of the finder works with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alert {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: String,
    pub kind: AlertKind,
    pub countries: Vec<String>,
    pub description: String,
    pub created: Option<String>,
}

impl Alert {
    /// Never fails: anything missing or oddly shaped falls back to a default.
    pub fn from_value(record: &Value) -> Self {
        let field = |name: &str| record.get(name).and_then(text);
        let id = field("@id").or_else(|| field("id"));

        let kind_term = match record.get("type") {
            Some(kind) if !kind.is_null() && kind.as_str() != Some("") => Term::from(kind),
            _ => Term::from(record.get("@type")),
        };

        Self {
            url: field("alertURL").or_else(|| id.clone()),
            id,
            title: field("title")
                .or_else(|| field("label"))
                .unwrap_or_else(|| UNTITLED.to_string()),
            kind: AlertKind::classify(&kind_term),
            countries: country_codes(
                &Term::from(record.get("country")),
                &Term::from(record.get("notifyingCountry")),
            ),
            description: description(record),
            created: field("created")
                .or_else(|| field("modified"))
                .or_else(|| field("dateModified")),
        }
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.countries.iter().map(|code| country_label(code)).collect()
    }

    pub fn date(&self) -> Option<String> {
        self.created.as_deref().map(format_date)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.kind, self.title)?;

        let mut meta = Vec::new();
        if let Some(date) = self.date() {
            meta.push(date);
        }
        meta.extend(self.country_names().into_iter().map(str::to_string));
        if !meta.is_empty() {
            writeln!(f, "  {}", meta.join(" | "))?;
        }

        writeln!(f, "  {}", self.description)?;

        if let Some(url) = &self.url {
            writeln!(f, "  View Full Alert: {url}")?;
        }

        Ok(())
    }
}

/// One decoded alerts response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub alerts: Vec<Alert>,
    pub total_results: Option<usize>,
    pub items_per_page: Option<usize>,
}

impl Page {
    pub fn from_value(body: &Value) -> Self {
        let alerts = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Alert::from_value).collect())
            .unwrap_or_default();

        let count = |name: &str| {
            body.get(name)
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
        };

        Self {
            alerts,
            total_results: count("totalResults"),
            items_per_page: count("itemsPerPage"),
        }
    }

    /// First non-zero of `totalResults`, `itemsPerPage` and the number of items received.
    pub fn total(&self) -> usize {
        [self.total_results, self.items_per_page]
            .into_iter()
            .flatten()
            .find(|n| *n > 0)
            .unwrap_or(self.alerts.len())
    }
}

/// An entry of a reference vocabulary such as `allergens`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyTerm {
    pub value: String,
    pub label: String,
}

impl VocabularyTerm {
    pub fn from_value(item: &Value) -> Option<Self> {
        let field = |name: &str| item.get(name).and_then(text);

        let notation = field("notation");
        let value = notation.clone().or_else(|| field("@id"))?;
        let label = field("label")
            .or_else(|| field("prefLabel"))
            .or(notation)
            .unwrap_or_else(|| value.clone());

        Some(Self { value, label })
    }

    pub fn list_from(body: &Value) -> Vec<Self> {
        body.get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}
