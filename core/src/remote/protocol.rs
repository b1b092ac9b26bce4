use crate::record::scan::ScanItem;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Query parameters accepted by the scan list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    pub cust_id: String,
    pub bgng_dt: String,
    pub end_dt: String,
    pub limit: usize,
}

impl ListQuery {
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/scans/simple?cust_id={}&bgng_dt={}&end_dt={}&limit={}",
            base_url.trim_end_matches('/'),
            self.cust_id,
            self.bgng_dt,
            self.end_dt,
            self.limit
        )
    }
}

/// Envelope shared by every scan endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListData {
    pub total: usize,
    pub count: usize,
    pub items: Vec<ScanItem>,
}

pub type ListResponse = Envelope<ListData>;
pub type DetailResponse = Envelope<ScanItem>;

/// Sorts by capture timestamp ascending; records without a parsable
/// timestamp sort first. Applied immediately after receipt.
pub fn sort_by_capture(items: &mut [ScanItem]) {
    items.sort_by_key(|item| item.capture_time().unwrap_or(NaiveDateTime::MIN));
}

/// Failure modes of a list or detail fetch. A superseded request is a
/// cancellation, silently discarded rather than surfaced as an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request superseded")]
    Superseded,
}

impl FetchError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchError::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_url_carries_all_parameters() {
        let query = ListQuery {
            cust_id: "87".into(),
            bgng_dt: "2025-07-20T00:00:00".into(),
            end_dt: "2025-07-26T23:59:59".into(),
            limit: 1000,
        };
        let url = query.url("http://127.0.0.1:9000/");
        assert_eq!(
            url,
            "http://127.0.0.1:9000/scans/simple?cust_id=87&bgng_dt=2025-07-20T00:00:00&end_dt=2025-07-26T23:59:59&limit=1000"
        );
    }

    #[test]
    fn sort_orders_by_capture_time_with_unparsable_first() {
        let mut items = vec![
            ScanItem {
                scan_id: Some("b".into()),
                capture_dt: Some("2025-07-21T10:00:00".into()),
                ..Default::default()
            },
            ScanItem {
                scan_id: Some("c".into()),
                capture_dt: None,
                ..Default::default()
            },
            ScanItem {
                scan_id: Some("a".into()),
                capture_dt: Some("2025-07-20T10:00:00".into()),
                ..Default::default()
            },
        ];
        sort_by_capture(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.scan_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn envelope_round_trips_with_mixed_coordinate_types() {
        let raw = r#"{
            "code": 200,
            "message": "ok",
            "data": {
                "total": 2,
                "count": 2,
                "items": [
                    {"scan_id": "s1", "lot": 126.9, "lat": "37.5"},
                    {"scan_id": "s2", "link_lot": "127.0", "link_lat": 36.4}
                ]
            }
        }"#;
        let response: ListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.data.items.len(), 2);
        assert!(response.data.items[0].map_position().is_some());
        assert!(response.data.items[1].map_position().is_some());
    }

    #[test]
    fn superseded_is_a_cancellation_not_an_error() {
        assert!(FetchError::Superseded.is_cancellation());
        assert!(!FetchError::Transport("refused".into()).is_cancellation());
    }
}
