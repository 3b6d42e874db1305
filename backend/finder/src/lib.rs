//! # Food Alerts Finder
//!
//! Client side of the food alerts search.
//!
//! ## Overall Data Structures
//!
//! - Filter set (country, alert type, hazard category, allergen, since): what the user asked for.
//!   Short codes only, e.g. `GB-SCT` or `AA`. Blank means no constraint.
//!
//! - Page request (filters, limit, offset, sort): derived fresh for every call. Limit is fixed
//!   at 20, sort is always newest first.
//!
//! - Session: offset, has-more flag, total, accumulated alerts, loading flag, last error. Lives
//!   for as long as the user keeps browsing and resets on every new search.
//!
//! - Alert: canonical record decoded from the upstream JSON-LD the moment it arrives.
//!
//! ### Relay
//! - `GET /api/alerts`: filters mapped to upstream names, see [`query`]
//! - `GET /api/ref/allergens`: allergen options, loaded once when the form opens
//! - `GET /api/ref/alert-type`: alert type vocabulary
//! - `GET /api/health`: liveness
//!
//!
//!
//! ## Notes
//! - The alert type URI lives under `food-alerts/def/alert-type/<code>`. An older revision used
//!   `food-alerts/def/<code>`, which upstream does not resolve.
//!
//! - A short page always ends pagination. If upstream ever returns a short page that is not
//!   the last one, the remaining alerts are never fetched.
//!
//! - Errors stop pagination but keep what was already loaded. Searching again clears them.
//!
//!
//!
//! ## Flow
//! 1. Load allergen options for allergy alert searches. An allergen that is not one of the
//!    options is dropped. Failure is logged and the search goes without the allergen.
//!
//! 2. Search with the submitted filters, default is Scotland only.
//!
//! 3. Render the first page with "Showing N of T results".
//!
//! 4. Load more while the user asks for it and the session says there is more.
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

pub mod calls;
pub mod client;
pub mod error;
pub mod filters;
pub mod models;
pub mod normalize;
pub mod query;
pub mod session;

use client::RelayClient;
use filters::{ALLERGY_ALERT, FilterSet};
use session::Session;

/// Loads the allergen options once when the filters ask for allergy alerts, and drops an
/// allergen the options do not know about.
pub async fn check_allergen(client: &RelayClient, mut filters: FilterSet) -> FilterSet {
    if filters.alert_type.as_deref() != Some(ALLERGY_ALERT) {
        return filters;
    }

    let options = match client.allergens().await {
        Ok(options) => options,
        Err(e) => {
            warn!("Failed to load allergens: {e}");
            Vec::new()
        }
    };

    if let Some(allergen) = filters.drop_unknown_allergen(&options) {
        warn!("Unknown allergen {allergen}, searching without it");
    }

    filters
}

/// Searches and keeps loading until `pages` pages are in or the results run out.
pub async fn browse(client: &RelayClient, filters: FilterSet, pages: usize) -> Session {
    let mut session = Session::new();

    let pb = ProgressBar::new_spinner();
    match ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        Ok(style) => pb.set_style(style),
        Err(e) => warn!("Invalid progress template: {e}"),
    }
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Searching for food alerts...");
    session.search(client, filters).await;

    for page in 2..=pages {
        if !session.has_more() {
            break;
        }

        pb.set_message(format!("Loading page {page}..."));
        session.load_more(client).await;
    }

    pb.finish_and_clear();
    session
}

pub fn render(session: &Session) -> String {
    let mut out = String::new();

    if let Some(error) = session.error() {
        out.push_str(&format!("Error: {error}\n\n"));
    }

    if session.alerts().is_empty() {
        if session.error().is_none() {
            out.push_str("No Alerts Found\n");
            out.push_str("Try adjusting your search filters or search for all alerts.\n");
        }
        return out;
    }

    out.push_str(&format!("Food Alerts ({})\n\n", session.summary()));
    for alert in session.alerts() {
        out.push_str(&alert.to_string());
        out.push('\n');
    }

    if session.has_more() {
        out.push_str("More alerts available, ask for more pages with --pages.\n");
    }

    out
}
