use std::fmt;

use crate::{error::FetchError, models::Page, query::PageRequest};

const FSA_HOST: &str = "data.food.gov.uk";

/// One alerts call as issued by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub id: usize,
    pub params: Vec<(&'static str, String)>,
    pub status: Option<u16>,
    pub item_count: usize,
    pub total_results: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog {
    records: Vec<CallRecord>,
}

impl CallLog {
    pub fn record(&mut self, request: &PageRequest, result: &Result<Page, FetchError>) {
        let (status, item_count, total_results) = match result {
            Ok(page) => (Some(200), page.alerts.len(), Some(page.total())),
            Err(e) => (e.status().map(|s| s.as_u16()), 0, None),
        };

        self.records.push(CallRecord {
            id: self.records.len() + 1,
            params: request.query_pairs(),
            status,
            item_count,
            total_results,
        });
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Vocabulary URIs are long, the last segment is what a reader cares about.
pub fn short_value(value: &str) -> &str {
    if value.contains(FSA_HOST) {
        value.rsplit('/').next().unwrap_or(value)
    } else {
        value
    }
}

impl fmt::Display for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "No API calls recorded yet.");
        }

        for record in self.records.iter().rev() {
            let params: Vec<String> = record
                .params
                .iter()
                .map(|(key, value)| format!("{key}={}", short_value(value)))
                .collect();
            let status = record
                .status
                .map_or_else(|| "error".to_string(), |s| s.to_string());
            let total = record
                .total_results
                .map_or_else(|| "-".to_string(), |t| t.to_string());

            writeln!(
                f,
                "#{} GET /api/alerts {} -> status {status}, items {}, total {total}",
                record.id,
                params.join(" "),
                record.item_count,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::filters::FilterSet;

    use super::*;

    #[test]
    fn test_short_value() {
        assert_eq!(
            short_value("http://data.food.gov.uk/codes/geographies/countries/GB-SCT"),
            "GB-SCT"
        );
        assert_eq!(short_value("-created"), "-created");
        assert_eq!(short_value("a/b"), "a/b");
    }

    #[test]
    fn test_records_are_numbered() {
        let mut log = CallLog::default();
        let request = PageRequest::new(FilterSet::scotland(), 0);

        log.record(&request, &Ok(Page::default()));
        log.record(&request, &Err(FetchError::Status(StatusCode::BAD_GATEWAY)));

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].status, Some(200));
        assert_eq!(records[1].id, 2);
        assert_eq!(records[1].status, Some(502));
        assert_eq!(records[1].total_results, None);
    }

    #[test]
    fn test_display_newest_first() {
        let mut log = CallLog::default();
        log.record(&PageRequest::new(FilterSet::scotland(), 0), &Ok(Page::default()));
        log.record(&PageRequest::new(FilterSet::scotland(), 20), &Ok(Page::default()));

        let rendered = log.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("#2 GET /api/alerts country=GB-SCT _limit=20 _offset=20"));
        assert!(lines[1].starts_with("#1 "));
    }
}
