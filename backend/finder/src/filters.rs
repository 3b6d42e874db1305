use crate::models::VocabularyTerm;

pub const DEFAULT_COUNTRY: &str = "GB-SCT";
pub const ALLERGY_ALERT: &str = "AA";

/// `(code, label)` pairs offered by the search form.
pub const COUNTRIES: [(&str, &str); 4] = [
    ("GB-SCT", "Scotland"),
    ("GB-ENG", "England"),
    ("GB-WLS", "Wales"),
    ("GB-NIR", "Northern Ireland"),
];

pub const ALERT_TYPES: [(&str, &str); 3] = [
    ("AA", "Allergy Alert"),
    ("PRIN", "Product Recall"),
    ("FAFA", "Food Alert for Action"),
];

pub const HAZARD_CATEGORIES: [(&str, &str); 6] = [
    ("Microbiological", "Microbiological"),
    ("Chemical", "Chemical"),
    ("ForeignBody", "Foreign Body"),
    ("Allergens", "Allergens"),
    ("Labelling", "Labelling"),
    ("Other", "Other"),
];

/// User-selected constraints. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub country: Option<String>,
    pub alert_type: Option<String>,
    pub hazard_category: Option<String>,
    pub allergen: Option<String>,
    pub since: Option<String>,
}

impl FilterSet {
    /// Filters used on first load and after a form reset.
    pub fn scotland() -> Self {
        Self {
            country: Some(DEFAULT_COUNTRY.to_string()),
            ..Self::default()
        }
    }

    /// Builds filters the way the search form submits them: blank fields are dropped and
    /// the allergen only counts for allergy alerts.
    pub fn from_form(
        country: Option<String>,
        alert_type: Option<String>,
        hazard_category: Option<String>,
        allergen: Option<String>,
        since: Option<String>,
    ) -> Self {
        let alert_type = present(alert_type);
        let allergen = match alert_type.as_deref() {
            Some(ALLERGY_ALERT) => present(allergen),
            _ => None,
        };

        Self {
            country: present(country),
            alert_type,
            hazard_category: present(hazard_category),
            allergen,
            since: present(since),
        }
    }

    /// Drops an allergen that is not one of the loaded `options` and returns it.
    pub fn drop_unknown_allergen(&mut self, options: &[VocabularyTerm]) -> Option<String> {
        let known = self
            .allergen
            .as_deref()
            .is_some_and(|allergen| options.iter().any(|term| term.value == allergen));

        if known { None } else { self.allergen.take() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
