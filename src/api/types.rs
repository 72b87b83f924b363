//! Wire types for the captured-mail API and their normalized forms.
//!
//! Raw responses carry headers as `map<name, values>` where any key may be
//! absent. Normalization fills the absent display headers with empty values
//! so the rest of the client never has to care.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Searchable header locations. The order of a location list is display
/// order, not search semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldName {
    From,
    To,
    Subject,
    Body,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [
        FieldName::From,
        FieldName::To,
        FieldName::Subject,
        FieldName::Body,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::From => "From",
            FieldName::To => "To",
            FieldName::Subject => "Subject",
            FieldName::Body => "Body",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical parameters of one search call.
///
/// Requests are value objects: every user interaction derives a new request
/// with the `with_*` constructors, a request already handed to an in-flight
/// call is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub struct SearchRequest {
    pub query: String,
    /// Ordered, duplicate-free.
    pub locations: Vec<FieldName>,
    pub limit: u64,
    pub offset: u64,
    #[serde(rename = "starttime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(limit: u64, locations: Vec<FieldName>) -> Self {
        Self {
            query: String::new(),
            locations,
            limit: limit.max(1),
            offset: 0,
            start_time: None,
        }
    }

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self.clone()
        }
    }

    pub fn with_offset(&self, offset: u64) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    pub fn with_locations(&self, locations: Vec<FieldName>) -> Self {
        Self {
            locations,
            ..self.clone()
        }
    }

    pub fn with_start_time(&self, start_time: Option<DateTime<Utc>>) -> Self {
        Self {
            start_time,
            ..self.clone()
        }
    }

    /// An empty query with no date bound constrains nothing; such a request
    /// degrades to the unfiltered list call.
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.start_time.is_none()
    }
}

/// Header map as the server sends it: Go `mail.Header`, every value a list.
pub type RawHeader = BTreeMap<String, Vec<String>>;

/// One message as returned by `/list`, `/search` and `/search/{id}`.
/// `Body` is only present on the single-message endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Header", default)]
    pub header: RawHeader,
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    /// Set once the message has been re-delivered. Absence is meaningful and
    /// is never defaulted.
    #[serde(rename = "Delivered", default)]
    pub delivered: Option<DateTime<Utc>>,
}

/// Header keys that must exist after normalization.
const DISPLAY_HEADERS: [&str; 4] = ["From", "To", "Subject", "Date"];

impl RawMessage {
    /// Fill absent display headers with empty values. Idempotent.
    pub fn normalized(mut self) -> Self {
        for key in DISPLAY_HEADERS {
            self.header.entry(key.to_string()).or_default();
        }
        self
    }
}

/// Response shape shared by `/list` and `/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Emails", default)]
    pub emails: Vec<RawMessage>,
    #[serde(rename = "Total", default)]
    pub total: u64,
    /// Echoed by the server; authoritative over the requested offset.
    #[serde(rename = "Offset", default)]
    pub offset: u64,
}

/// Normalized display headers of one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHeader {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
}

impl MessageHeader {
    fn from_raw(raw: &RawHeader) -> Self {
        Self {
            from: join_header(raw, "From"),
            to: join_header(raw, "To"),
            subject: join_header(raw, "Subject"),
            date: join_header(raw, "Date"),
        }
    }
}

/// Multi-valued headers display comma-joined; absent ones as "".
fn join_header(raw: &RawHeader, key: &str) -> String {
    raw.get(key).map(|v| v.join(", ")).unwrap_or_default()
}

/// One row of the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSummary {
    pub id: u64,
    pub header: MessageHeader,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<RawMessage> for MessageSummary {
    fn from(raw: RawMessage) -> Self {
        let raw = raw.normalized();
        Self {
            header: MessageHeader::from_raw(&raw.header),
            id: raw.id,
            delivered_at: raw.delivered,
        }
    }
}

/// Full content of one message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDetail {
    pub id: u64,
    pub header: MessageHeader,
    pub body: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<RawMessage> for MessageDetail {
    fn from(raw: RawMessage) -> Self {
        let raw = raw.normalized();
        Self {
            header: MessageHeader::from_raw(&raw.header),
            id: raw.id,
            body: raw.body.unwrap_or_default(),
            delivered_at: raw.delivered,
        }
    }
}

/// The displayed search output. Replaced wholesale on every successful
/// search; on failure only `error` is touched and the prior data stays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Server order, never re-sorted client-side.
    pub emails: Vec<MessageSummary>,
    pub total: u64,
    pub offset: u64,
    /// The limit that produced this page. Paging arithmetic uses this, not
    /// whatever limit a later request might carry.
    pub limit: u64,
    pub pages: u64,
    pub error: Option<String>,
}

impl ResultSet {
    pub fn empty(limit: u64) -> Self {
        Self {
            limit: limit.max(1),
            ..Self::default()
        }
    }

    pub fn from_response(response: SearchResponse, limit: u64) -> Self {
        let limit = limit.max(1);
        Self {
            emails: response.emails.into_iter().map(Into::into).collect(),
            total: response.total,
            offset: response.offset,
            limit,
            pages: response.total.div_ceil(limit),
            error: None,
        }
    }

    /// 1-based page of the displayed offset, in `[1, max(pages, 1)]`.
    pub fn current_page(&self) -> u64 {
        self.offset / self.limit.max(1) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_message(id: u64, header: &[(&str, &[&str])]) -> RawMessage {
        RawMessage {
            id,
            header: header
                .iter()
                .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
                .collect(),
            body: None,
            delivered: None,
        }
    }

    #[test]
    fn test_normalize_fills_absent_headers() {
        let summary: MessageSummary = raw_message(1, &[("Subject", &["foo bar"])]).into();
        assert_eq!(summary.header.subject, "foo bar");
        assert_eq!(summary.header.from, "");
        assert_eq!(summary.header.to, "");
        assert_eq!(summary.header.date, "");
        assert!(summary.delivered_at.is_none());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = raw_message(7, &[("From", &["a@example.com"])]);
        let once = raw.clone().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multi_valued_headers_join_with_comma() {
        let summary: MessageSummary =
            raw_message(2, &[("To", &["a@example.com", "b@example.com"])]).into();
        assert_eq!(summary.header.to, "a@example.com, b@example.com");
    }

    #[test]
    fn test_delivered_survives_normalization() {
        let mut raw = raw_message(3, &[]);
        raw.delivered = Some(Utc::now());
        let delivered = raw.delivered;
        let summary: MessageSummary = raw.into();
        assert_eq!(summary.delivered_at, delivered);
    }

    #[test]
    fn test_result_set_pagination_invariants() {
        let response = SearchResponse {
            emails: Vec::new(),
            total: 41,
            offset: 20,
        };
        let result = ResultSet::from_response(response, 20);
        assert_eq!(result.pages, 3);
        assert_eq!(result.current_page(), 2);
        assert!(result.offset <= result.total);
        assert!(result.current_page() >= 1);
        assert!(result.current_page() <= result.pages.max(1));
    }

    #[test]
    fn test_result_set_empty_total() {
        let result = ResultSet::from_response(SearchResponse::default(), 20);
        assert_eq!(result.pages, 0);
        assert_eq!(result.current_page(), 1);
    }

    #[test]
    fn test_response_decodes_and_normalizes_sample_payload() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"Emails":[{"ID":1,"Header":{"Subject":["foo bar"]}}],"Total":1,"Offset":0}"#,
        )
        .unwrap();
        let result = ResultSet::from_response(response, 20);
        assert_eq!(result.emails.len(), 1);
        assert_eq!(result.emails[0].header.subject, "foo bar");
        assert_eq!(result.emails[0].header.from, "");
        assert_eq!(result.emails[0].header.to, "");
        assert_eq!(result.emails[0].header.date, "");
        assert_eq!(result.pages, 1);
        assert_eq!(result.current_page(), 1);
    }

    #[test]
    fn test_request_serializes_lowercase_wire_fields() {
        let request = SearchRequest::new(20, vec![FieldName::Subject]).with_query("foo");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["query"], "foo");
        assert_eq!(value["locations"][0], "Subject");
        assert_eq!(value["limit"], 20);
        assert_eq!(value["offset"], 0);
        assert!(value.get("starttime").is_none());
    }

    #[test]
    fn test_with_constructors_leave_original_untouched() {
        let base = SearchRequest::new(20, vec![FieldName::From]);
        let paged = base.with_offset(40).with_query("invoice");
        assert_eq!(base.offset, 0);
        assert_eq!(base.query, "");
        assert_eq!(paged.offset, 40);
        assert_eq!(paged.query, "invoice");
    }
}
