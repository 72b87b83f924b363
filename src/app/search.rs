//! Search controller: owns the active request, the displayed result set and
//! the race-safety bookkeeping for overlapping search calls.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, ResultSet, SearchRequest, SearchResponse};
use crate::route::SearchDefaults;

use super::AppEvent;

/// Sole owner and writer of the displayed [`ResultSet`].
///
/// Every issued call carries a monotonically increasing sequence number.
/// A completion is applied only if its sequence is the highest completed so
/// far, so the displayed result always reflects the last *issued* request
/// even when responses resolve out of order. Stale responses are dropped
/// silently; in-flight calls are never cancelled.
#[derive(Debug, Clone)]
pub struct SearchController {
    /// Carried-forward state not encoded in the address: limit, searched
    /// locations and the day window. Mutated by the in-session options
    /// panel, never by responses.
    pub defaults: SearchDefaults,
    request: SearchRequest,
    result: ResultSet,
    next_seq: u64,
    applied_seq: u64,
}

impl SearchController {
    pub fn new(defaults: SearchDefaults) -> Self {
        let request = SearchRequest::new(defaults.limit, defaults.locations.clone());
        let result = ResultSet::empty(defaults.limit);
        Self {
            defaults,
            request,
            result,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn result(&self) -> &ResultSet {
        &self.result
    }

    /// Replace the active request with a freshly derived one.
    pub fn set_request(&mut self, request: SearchRequest) {
        self.request = request;
    }

    /// Whether an issued call has not completed yet.
    pub fn in_flight(&self) -> bool {
        self.next_seq > self.applied_seq
    }

    /// Allocate the sequence number for the next call.
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Candidate offset for a 1-based target page, computed against the
    /// currently displayed result. Returns `None` when the target is
    /// outside the known bounds; callers treat that as a local no-op with
    /// no network call and no state change.
    pub fn page_offset(&self, page: u64) -> Option<u64> {
        if page < 1 {
            return None;
        }
        let limit = self.result.limit.max(1);
        let offset = limit * (page - 1);
        (offset <= self.result.total).then_some(offset)
    }

    /// Issue the active request. Attaches the configured day window and
    /// degrades to the unfiltered list call when nothing constrains the
    /// search. The completion arrives as an [`AppEvent::SearchFinished`].
    pub fn issue(&mut self, client: &ApiClient, events: &mpsc::Sender<AppEvent>) {
        let request = self
            .request
            .with_start_time(day_window_start(self.defaults.days));
        let seq = self.begin();
        let client = client.clone();
        let events = events.clone();
        tracing::debug!(seq, query = %request.query, offset = request.offset, "issuing search");
        tokio::spawn(async move {
            let limit = request.limit;
            let outcome = if request.is_unfiltered() {
                client.list().await
            } else {
                client.search(&request).await
            };
            events
                .send(AppEvent::SearchFinished { seq, limit, outcome })
                .await
                .ok();
        });
    }

    /// Apply a completion. `limit` is the limit the completed call was
    /// issued with; the displayed result keeps it for its paging arithmetic.
    /// Returns false when the response was stale and discarded. On success
    /// the result set is replaced wholesale and the error cleared; on
    /// failure the prior data stays and only the error is set.
    pub fn apply(&mut self, seq: u64, limit: u64, outcome: Result<SearchResponse, ApiError>) -> bool {
        if seq <= self.applied_seq {
            tracing::debug!(seq, applied = self.applied_seq, "discarding stale search response");
            return false;
        }
        self.applied_seq = seq;
        match outcome {
            Ok(response) => {
                self.result = ResultSet::from_response(response, limit);
            }
            Err(err) => {
                self.result.error = Some(err.to_string());
            }
        }
        true
    }
}

/// Start of the "search last N days" window; `None` when unbounded.
pub fn day_window_start(days: u32) -> Option<DateTime<Utc>> {
    (days > 0).then(|| Utc::now() - Duration::days(i64::from(days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawMessage;

    fn controller() -> SearchController {
        SearchController::new(SearchDefaults::default())
    }

    fn response(total: u64, offset: u64, ids: &[u64]) -> SearchResponse {
        SearchResponse {
            emails: ids
                .iter()
                .map(|id| RawMessage {
                    id: *id,
                    header: Default::default(),
                    body: None,
                    delivered: None,
                })
                .collect(),
            total,
            offset,
        }
    }

    #[test]
    fn test_last_issued_wins_when_responses_arrive_out_of_order() {
        let mut ctrl = controller();
        let a = ctrl.begin();
        let b = ctrl.begin();

        assert!(ctrl.apply(b, 20, Ok(response(2, 0, &[20]))));
        assert!(!ctrl.apply(a, 20, Ok(response(1, 0, &[10]))));

        assert_eq!(ctrl.result().emails.len(), 1);
        assert_eq!(ctrl.result().emails[0].id, 20);
        assert_eq!(ctrl.result().total, 2);
    }

    #[test]
    fn test_in_order_responses_both_apply() {
        let mut ctrl = controller();
        let a = ctrl.begin();
        let b = ctrl.begin();

        assert!(ctrl.apply(a, 20, Ok(response(1, 0, &[10]))));
        assert!(ctrl.apply(b, 20, Ok(response(2, 0, &[20]))));
        assert_eq!(ctrl.result().emails[0].id, 20);
    }

    #[test]
    fn test_failure_keeps_prior_data_and_sets_error() {
        let mut ctrl = controller();
        let a = ctrl.begin();
        assert!(ctrl.apply(a, 20, Ok(response(40, 20, &[1, 2]))));

        let b = ctrl.begin();
        assert!(ctrl.apply(b, 20, Err(ApiError::Application("boom".to_string()))));

        let result = ctrl.result();
        assert_eq!(result.emails.len(), 2);
        assert_eq!(result.total, 40);
        assert_eq!(result.offset, 20);
        assert_eq!(result.pages, 2);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut ctrl = controller();
        let a = ctrl.begin();
        ctrl.apply(a, 20, Err(ApiError::Application("boom".to_string())));
        let b = ctrl.begin();
        ctrl.apply(b, 20, Ok(response(1, 0, &[1])));
        assert!(ctrl.result().error.is_none());
    }

    #[test]
    fn test_failed_newer_request_still_supersedes_older_success() {
        // B fails after A was issued; A's late success must not resurface.
        let mut ctrl = controller();
        let a = ctrl.begin();
        let b = ctrl.begin();
        assert!(ctrl.apply(b, 20, Err(ApiError::Application("boom".to_string()))));
        assert!(!ctrl.apply(a, 20, Ok(response(9, 0, &[9]))));
        assert_eq!(ctrl.result().error.as_deref(), Some("boom"));
        assert!(ctrl.result().emails.is_empty());
    }

    #[test]
    fn test_page_offset_guards_known_bounds() {
        let mut ctrl = controller();
        let seq = ctrl.begin();
        ctrl.apply(seq, 20, Ok(response(40, 0, &[1])));

        // total=40, limit=20: pages 1..=2 reachable, offset==total allowed.
        assert_eq!(ctrl.page_offset(1), Some(0));
        assert_eq!(ctrl.page_offset(2), Some(20));
        assert_eq!(ctrl.page_offset(3), Some(40));
        // Candidate offset 60 > 40: local no-op.
        assert_eq!(ctrl.page_offset(4), None);
        assert_eq!(ctrl.page_offset(0), None);
    }

    #[test]
    fn test_page_offset_uses_displayed_limit() {
        let mut ctrl = controller();
        let seq = ctrl.begin();
        ctrl.apply(seq, 20, Ok(response(100, 0, &[1])));

        // The limit changes after the result was displayed; paging math
        // stays on the displayed result's limit.
        ctrl.defaults.limit = 50;
        ctrl.set_request(SearchRequest::new(50, ctrl.defaults.locations.clone()));
        assert_eq!(ctrl.page_offset(3), Some(40));
    }

    #[test]
    fn test_result_carries_the_issued_limit_not_the_active_one() {
        let mut ctrl = controller();
        let a = ctrl.begin();

        // The active request grows its page size while A is in flight; A's
        // result still pages with the limit it was issued with.
        ctrl.set_request(SearchRequest::new(50, ctrl.defaults.locations.clone()));
        assert!(ctrl.apply(a, 20, Ok(response(100, 0, &[1]))));
        assert_eq!(ctrl.result().limit, 20);
        assert_eq!(ctrl.result().pages, 5);
    }

    #[test]
    fn test_in_flight_tracking() {
        let mut ctrl = controller();
        assert!(!ctrl.in_flight());
        let seq = ctrl.begin();
        assert!(ctrl.in_flight());
        ctrl.apply(seq, 20, Ok(response(0, 0, &[])));
        assert!(!ctrl.in_flight());
    }

    #[test]
    fn test_day_window_start() {
        assert!(day_window_start(0).is_none());
        let start = day_window_start(7).unwrap();
        let expected = Utc::now() - Duration::days(7);
        assert!((start - expected).num_seconds().abs() < 5);
    }
}
