//! # FSA Open Data
//!
//! Upstream collaborator for every relay route.
//!
//! ## Endpoints
//! - Alerts: `<base>/id?<params>`, paginated by `_limit` / `_offset`, sorted by `_sort`
//! - Vocabularies: `<base>/def/<type>` such as `allergens`, `hazard-category` or `alert-type`
//!
//! ## Parameter Mapping
//! The frontend speaks in flat names. Two of them live under the `problem` node upstream,
//! so the relay rewrites them before forwarding:
//! - `hazardCategory` -> `problem.hazardCategory`
//! - `allergen` -> `problem.allergen`
//!
//! Everything else is forwarded as-is, including codes we do not recognise. Upstream decides
//! whether to reject or ignore them.
//!
//! ## Failure
//! No retries, no caching, no timeout beyond the transport default. Any non-2xx status or
//! transport failure becomes an [`UpstreamError`] and the route answers 500.
use reqwest::{Client, StatusCode, Url, header::ACCEPT};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

pub const ALERTS_PATH: &str = "id";
pub const DEFINITIONS_PATH: &str = "def";
pub const ALERT_TYPE_VOCABULARY: &str = "alert-type";

const RENAMED_PARAMS: [(&str, &str); 2] = [
    ("hazardCategory", "problem.hazardCategory"),
    ("allergen", "problem.allergen"),
];

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("FSA API responded with status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("FSA base URL cannot take path segments: {0}")]
    BaseUrl(Url),
}

#[derive(Clone)]
pub struct Upstream {
    client: Client,
    base: Url,
}

impl Upstream {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub async fn fetch_alerts(&self, params: &[(String, String)]) -> Result<Value, UpstreamError> {
        let url = self.alerts_url(params)?;
        info!("Proxying to: {url}");

        self.get_json(url).await
    }

    pub async fn fetch_reference(&self, vocabulary: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&[DEFINITIONS_PATH, vocabulary])?;
        info!("Proxying reference data: {url}");

        self.get_json(url).await
    }

    pub fn alerts_url(&self, params: &[(String, String)]) -> Result<Url, UpstreamError> {
        let mut url = self.endpoint(&[ALERTS_PATH])?;

        let forwarded = forwarded_params(params);
        if !forwarded.is_empty() {
            url.query_pairs_mut().extend_pairs(forwarded);
        }

        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|_| UpstreamError::BaseUrl(self.base.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(response.json().await?)
    }
}

/// Drops empty values and applies the upstream field renames, keeping order.
pub fn forwarded_params(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (upstream_name(key), value.as_str()))
        .collect()
}

pub fn upstream_name(key: &str) -> &str {
    RENAMED_PARAMS
        .iter()
        .find(|(local, _)| *local == key)
        .map_or(key, |(_, upstream)| *upstream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(base: &str) -> Upstream {
        Upstream::new(Client::new(), base.parse().unwrap())
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_upstream_name() {
        assert_eq!(upstream_name("hazardCategory"), "problem.hazardCategory");
        assert_eq!(upstream_name("allergen"), "problem.allergen");
        assert_eq!(upstream_name("country"), "country");
        assert_eq!(upstream_name("_limit"), "_limit");
    }

    #[test]
    fn test_forwarded_params_skip_empty() {
        let params = pairs(&[("country", ""), ("allergen", "GLU"), ("_limit", "20")]);

        assert_eq!(
            forwarded_params(&params),
            vec![("problem.allergen", "GLU"), ("_limit", "20")]
        );
    }

    #[test]
    fn test_alerts_url() {
        let url = upstream("https://data.food.gov.uk/food-alerts")
            .alerts_url(&pairs(&[
                ("hazardCategory", "Chemical"),
                ("_sort", "-created"),
            ]))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://data.food.gov.uk/food-alerts/id?problem.hazardCategory=Chemical&_sort=-created"
        );
    }

    #[test]
    fn test_alerts_url_without_params() {
        let url = upstream("https://data.food.gov.uk/food-alerts/")
            .alerts_url(&[])
            .unwrap();

        assert_eq!(url.as_str(), "https://data.food.gov.uk/food-alerts/id");
    }

    #[test]
    fn test_reference_segment_is_escaped() {
        let url = upstream("https://data.food.gov.uk/food-alerts")
            .endpoint(&[DEFINITIONS_PATH, "a b"])
            .unwrap();

        assert_eq!(url.as_str(), "https://data.food.gov.uk/food-alerts/def/a%20b");
    }

    #[test]
    fn test_status_message() {
        let err = UpstreamError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "FSA API responded with status: 503");
    }
}
