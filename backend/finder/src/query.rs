use crate::filters::FilterSet;

pub const PAGE_SIZE: usize = 20;
pub const SORT_NEWEST_FIRST: &str = "-created";

pub const COUNTRY_NAMESPACE: &str = "http://data.food.gov.uk/codes/geographies/countries/";
pub const ALERT_TYPE_NAMESPACE: &str = "http://data.food.gov.uk/food-alerts/def/alert-type/";

pub const LIMIT_PARAM: &str = "_limit";
pub const OFFSET_PARAM: &str = "_offset";
pub const SORT_PARAM: &str = "_sort";

/// One page worth of an alerts search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filters: FilterSet,
    pub limit: usize,
    pub offset: usize,
    pub sort: &'static str,
}

impl PageRequest {
    pub fn new(filters: FilterSet, offset: usize) -> Self {
        Self {
            filters,
            limit: PAGE_SIZE,
            offset,
            sort: SORT_NEWEST_FIRST,
        }
    }

    /// Query pairs for the relay's alerts route, filters first then pagination.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let filters = &self.filters;
        let mut pairs = Vec::with_capacity(8);

        if let Some(country) = given(&filters.country) {
            pairs.push(("country", format!("{COUNTRY_NAMESPACE}{country}")));
        }
        if let Some(alert_type) = given(&filters.alert_type) {
            pairs.push(("type", format!("{ALERT_TYPE_NAMESPACE}{alert_type}")));
        }
        if let Some(hazard_category) = given(&filters.hazard_category) {
            pairs.push(("hazardCategory", hazard_category.to_string()));
        }
        if let Some(allergen) = given(&filters.allergen) {
            pairs.push(("allergen", allergen.to_string()));
        }
        if let Some(since) = given(&filters.since) {
            pairs.push(("since", since.to_string()));
        }

        pairs.push((LIMIT_PARAM, self.limit.to_string()));
        pairs.push((OFFSET_PARAM, self.offset.to_string()));
        pairs.push((SORT_PARAM, self.sort.to_string()));

        pairs
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
