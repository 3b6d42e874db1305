//! # Search Session
//!
//! All state behind one results list: active filters, offset, totals, the accumulated
//! alerts, loading flag and last error.
//!
//! ## Flow
//! - [`Session::begin_search`] starts over at offset 0 and clears the list
//! - [`Session::begin_load_more`] continues at the current offset, refused while loading or
//!   when the last page said there is nothing more
//! - [`Session::apply`] folds the response of either into the state
//!
//! Each `begin_*` hands out a [`Ticket`] stamped with the session generation. A new search
//! bumps the generation, so a slow response for an older search is dropped instead of
//! mixing into the new list.
//!
//! ## Pagination
//! More pages exist only when the last page was full **and** the offset is still below
//! the reported total. A short page always ends the session, even if the total says
//! otherwise.
use tracing::{debug, info, warn};

use crate::{
    calls::CallLog,
    client::AlertSource,
    error::FetchError,
    filters::FilterSet,
    models::{Alert, Page},
    query::PageRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Replace,
    Append,
}

/// A request issued by the session, to be handed back to [`Session::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    mode: Mode,
    pub request: PageRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied { received: usize },
    Failed,
    Superseded,
}

#[derive(Debug, Default)]
pub struct Session {
    filters: FilterSet,
    offset: usize,
    has_more: bool,
    total_results: usize,
    alerts: Vec<Alert>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    calls: CallLog,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_search(&mut self, filters: FilterSet) -> Ticket {
        self.generation += 1;
        self.filters = filters;
        self.offset = 0;
        self.has_more = false;
        self.total_results = 0;
        self.alerts.clear();
        self.error = None;
        self.loading = true;

        debug!("Search #{} with {:?}", self.generation, self.filters);

        Ticket {
            generation: self.generation,
            mode: Mode::Replace,
            request: PageRequest::new(self.filters.clone(), 0),
        }
    }

    pub fn begin_load_more(&mut self) -> Option<Ticket> {
        if self.loading || !self.has_more {
            return None;
        }

        self.loading = true;
        self.error = None;

        Some(Ticket {
            generation: self.generation,
            mode: Mode::Append,
            request: PageRequest::new(self.filters.clone(), self.offset),
        })
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Page, FetchError>) -> Outcome {
        self.calls.record(&ticket.request, &result);

        if ticket.generation != self.generation {
            info!(
                "Dropping response for superseded search #{} (now #{})",
                ticket.generation, self.generation
            );
            return Outcome::Superseded;
        }

        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!("Error fetching alerts: {e}");
                self.error = Some(e.to_string());
                self.has_more = false;
                return Outcome::Failed;
            }
        };

        let received = page.alerts.len();
        let reported_total = page.total();

        match ticket.mode {
            Mode::Replace => self.alerts = page.alerts,
            Mode::Append => self.alerts.extend(page.alerts),
        }

        self.offset = ticket.request.offset + received;
        self.has_more = received == ticket.request.limit && self.offset < reported_total;
        self.total_results = reported_total.max(self.alerts.len());

        Outcome::Applied { received }
    }

    pub async fn search<S: AlertSource>(&mut self, source: &S, filters: FilterSet) -> Outcome {
        let ticket = self.begin_search(filters);
        let result = source.fetch_page(&ticket.request).await;

        self.apply(ticket, result)
    }

    /// `None` when there is nothing to load or a request is already in flight.
    pub async fn load_more<S: AlertSource>(&mut self, source: &S) -> Option<Outcome> {
        let ticket = self.begin_load_more()?;
        let result = source.fetch_page(&ticket.request).await;

        Some(self.apply(ticket, result))
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total_results(&self) -> usize {
        self.total_results
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn calls(&self) -> &CallLog {
        &self.calls
    }

    /// "Showing N of T results" line for the results header.
    pub fn summary(&self) -> String {
        match self.total_results {
            0 => format!("Showing {} results", self.alerts.len()),
            total => format!("Showing {} of {total} results", self.alerts.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use reqwest::StatusCode;

    use crate::query::PAGE_SIZE;

    use super::*;

    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<Result<Page, FetchError>>>,
        offsets: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Page, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                offsets: Mutex::default(),
            }
        }

        fn offsets(&self) -> Vec<usize> {
            self.offsets.lock().unwrap().clone()
        }
    }

    impl AlertSource for Scripted {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
            self.offsets.lock().unwrap().push(request.offset);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn page(ids: std::ops::Range<usize>, total: Option<usize>) -> Page {
        Page {
            alerts: ids
                .map(|n| Alert {
                    id: Some(format!("alert-{n}")),
                    ..Alert::default()
                })
                .collect(),
            total_results: total,
            items_per_page: None,
        }
    }

    fn ids(session: &Session) -> Vec<String> {
        session
            .alerts()
            .iter()
            .filter_map(|alert| alert.id.clone())
            .collect()
    }

    fn relay_failure() -> FetchError {
        FetchError::Relay {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Failed to fetch alerts".to_string(),
            message: "FSA API responded with status: 503".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pages_until_total() {
        let source = Scripted::new(vec![
            Ok(page(0..20, Some(45))),
            Ok(page(20..40, Some(45))),
            Ok(page(40..45, Some(45))),
        ]);
        let mut session = Session::new();

        assert_eq!(
            session.search(&source, FilterSet::scotland()).await,
            Outcome::Applied { received: 20 }
        );
        assert_eq!(session.offset(), 20);
        assert!(session.has_more());

        session.load_more(&source).await;
        assert_eq!(session.offset(), 40);
        assert!(session.has_more());

        session.load_more(&source).await;
        assert_eq!(session.offset(), 45);
        assert!(!session.has_more());
        assert_eq!(session.alerts().len(), 45);
        assert_eq!(source.offsets(), vec![0, 20, 40]);

        assert_eq!(session.load_more(&source).await, None);
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let source = Scripted::new(vec![Ok(page(0..20, Some(30))), Ok(page(20..30, Some(30)))]);
        let mut session = Session::new();

        session.search(&source, FilterSet::default()).await;
        session.load_more(&source).await;

        let expected: Vec<String> = (0..30).map(|n| format!("alert-{n}")).collect();
        assert_eq!(ids(&session), expected);
    }

    #[tokio::test]
    async fn test_search_replaces_everything() {
        let source = Scripted::new(vec![
            Ok(page(0..20, Some(100))),
            Ok(page(20..40, Some(100))),
            Ok(page(500..503, Some(3))),
        ]);
        let mut session = Session::new();

        session.search(&source, FilterSet::scotland()).await;
        session.load_more(&source).await;
        assert_eq!(session.alerts().len(), 40);

        session.search(&source, FilterSet::default()).await;

        assert_eq!(ids(&session), vec!["alert-500", "alert-501", "alert-502"]);
        assert_eq!(session.offset(), 3);
        assert_eq!(session.total_results(), 3);
        assert!(session.filters().is_empty());
        assert_eq!(source.offsets(), vec![0, 20, 0]);
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        for total in [None, Some(19), Some(20), Some(1_000)] {
            let source = Scripted::new(vec![Ok(page(0..19, total))]);
            let mut session = Session::new();

            session.search(&source, FilterSet::default()).await;

            assert!(!session.has_more(), "total {total:?}");
        }
    }

    #[tokio::test]
    async fn test_full_page_at_total_ends_pagination() {
        let source = Scripted::new(vec![Ok(page(0..PAGE_SIZE, Some(PAGE_SIZE)))]);
        let mut session = Session::new();

        session.search(&source, FilterSet::default()).await;

        assert!(!session.has_more());
    }

    #[tokio::test]
    async fn test_failure_keeps_results() {
        let source = Scripted::new(vec![Ok(page(0..20, Some(45))), Err(relay_failure())]);
        let mut session = Session::new();

        session.search(&source, FilterSet::scotland()).await;
        assert_eq!(session.load_more(&source).await, Some(Outcome::Failed));

        assert_eq!(session.error(), Some("FSA API responded with status: 503"));
        assert_eq!(session.alerts().len(), 20);
        assert_eq!(session.offset(), 20);
        assert!(!session.has_more());
        assert!(!session.is_loading());
        assert_eq!(session.load_more(&source).await, None);
    }

    #[tokio::test]
    async fn test_new_search_clears_error() {
        let source = Scripted::new(vec![Err(relay_failure()), Ok(page(0..2, Some(2)))]);
        let mut session = Session::new();

        assert_eq!(session.search(&source, FilterSet::scotland()).await, Outcome::Failed);
        assert!(session.error().is_some());

        session.search(&source, FilterSet::scotland()).await;
        assert_eq!(session.error(), None);
        assert_eq!(session.alerts().len(), 2);
    }

    #[test]
    fn test_superseded_response_is_dropped() {
        let mut session = Session::new();

        let first = session.begin_search(FilterSet::scotland());
        let second = session.begin_search(FilterSet::default());

        assert_eq!(
            session.apply(second, Ok(page(0..2, Some(2)))),
            Outcome::Applied { received: 2 }
        );
        assert_eq!(
            session.apply(first, Ok(page(100..120, Some(300)))),
            Outcome::Superseded
        );

        assert_eq!(ids(&session), vec!["alert-0", "alert-1"]);
        assert_eq!(session.total_results(), 2);
        assert_eq!(session.calls().len(), 2);
    }

    #[test]
    fn test_loading_gates_load_more() {
        let mut session = Session::new();
        let ticket = session.begin_search(FilterSet::default());

        assert!(session.is_loading());
        assert_eq!(session.begin_load_more(), None);

        session.apply(ticket, Ok(page(0..20, Some(40))));
        let more = session.begin_load_more().unwrap();

        assert_eq!(more.request.offset, 20);
        assert_eq!(session.begin_load_more(), None);
    }

    #[test]
    fn test_total_never_below_accumulated() {
        let mut session = Session::new();
        let ticket = session.begin_search(FilterSet::default());

        session.apply(ticket, Ok(page(0..5, Some(2))));

        assert_eq!(session.total_results(), 5);
        assert_eq!(session.summary(), "Showing 5 of 5 results");
    }

    #[test]
    fn test_summary_without_total() {
        assert_eq!(Session::new().summary(), "Showing 0 results");
    }
}
