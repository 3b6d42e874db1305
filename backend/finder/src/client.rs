use std::future::Future;

use reqwest::{Client, Url, header::ACCEPT};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    models::{Page, VocabularyTerm},
    query::PageRequest,
};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001/api";
pub const ALLERGENS_VOCABULARY: &str = "allergens";

/// Anything that can answer a [`PageRequest`]. The session only talks to this.
pub trait AlertSource {
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

#[derive(Deserialize)]
struct Envelope {
    error: String,
    message: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    base: Url,
}

impl RelayClient {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let base = base
            .parse::<Url>()
            .map_err(|e| FetchError::RelayUrl(format!("{base}: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(FetchError::RelayUrl(base.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub async fn alerts(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let mut url = self.endpoint(&["alerts"])?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        let body = self.get_json(url).await?;

        Ok(Page::from_value(&body))
    }

    pub async fn reference(&self, vocabulary: &str) -> Result<Vec<VocabularyTerm>, FetchError> {
        let url = self.endpoint(&["ref", vocabulary])?;
        let body = self.get_json(url).await?;

        Ok(VocabularyTerm::list_from(&body))
    }

    /// Allergen options for the search form, fetched once at startup.
    pub async fn allergens(&self) -> Result<Vec<VocabularyTerm>, FetchError> {
        self.reference(ALLERGENS_VOCABULARY).await
    }

    pub async fn alert_types(&self) -> Result<Vec<VocabularyTerm>, FetchError> {
        self.reference("alert-type").await
    }

    pub async fn health(&self) -> Result<Health, FetchError> {
        let url = self.endpoint(&["health"])?;
        let body = self.get_json(url).await?;

        Ok(serde_json::from_value(body)?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|_| FetchError::RelayUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<Envelope>(&bytes) {
            Ok(Envelope { error, message }) => {
                warn!("{error}: {message}");
                Err(FetchError::Relay {
                    status,
                    error,
                    message,
                })
            }
            Err(_) => Err(FetchError::Status(status)),
        }
    }
}

impl AlertSource for RelayClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        self.alerts(request).await
    }
}
