//! Message view controller: loads a single message and drives re-delivery.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, MessageDetail};

use super::AppEvent;

/// Load phase of the open message.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Loaded(MessageDetail),
    Failed(String),
}

/// The single open message. At most one exists; opening another replaces it.
#[derive(Debug, Clone)]
pub struct MessageView {
    pub id: u64,
    pub load: LoadState,
    /// When the message was (re-)delivered. Comes from the loaded payload
    /// or from a confirmed re-delivery; absence means never delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    pub sending: bool,
    pub send_error: Option<String>,
    pub scroll: u16,
}

impl MessageView {
    fn new(id: u64) -> Self {
        Self {
            id,
            load: LoadState::Loading,
            delivered_at: None,
            sending: false,
            send_error: None,
            scroll: 0,
        }
    }

    pub fn detail(&self) -> Option<&MessageDetail> {
        match &self.load {
            LoadState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Sole owner and writer of the message view. Load completions go through
/// the same last-issued-wins sequence discipline as searches, so opening a
/// second message while the first is still loading can never end up showing
/// the first one's response, whichever order the two resolve in.
#[derive(Debug, Clone, Default)]
pub struct MessageController {
    view: Option<MessageView>,
    next_seq: u64,
    applied_seq: u64,
}

impl MessageController {
    pub fn view(&self) -> Option<&MessageView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut MessageView> {
        self.view.as_mut()
    }

    pub fn in_flight(&self) -> bool {
        self.next_seq > self.applied_seq
    }

    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Open a message: replace any prior view and fetch the content. The
    /// completion arrives as an [`AppEvent::MessageLoaded`].
    pub fn open(&mut self, id: u64, client: &ApiClient, events: &mpsc::Sender<AppEvent>) {
        self.view = Some(MessageView::new(id));
        let seq = self.begin();
        let client = client.clone();
        let events = events.clone();
        tracing::debug!(seq, id, "loading message");
        tokio::spawn(async move {
            let outcome = client.message(id).await;
            events
                .send(AppEvent::MessageLoaded { seq, outcome })
                .await
                .ok();
        });
    }

    /// Drop the view when navigating away from the message address.
    pub fn close(&mut self) {
        self.view = None;
    }

    /// Apply a load completion. Each open supersedes the prior one, so only
    /// the latest open's completion may apply; responses for superseded opens
    /// are discarded no matter which order they arrive in. Prior fields stay
    /// untouched on failure.
    pub fn apply_load(&mut self, seq: u64, outcome: Result<MessageDetail, ApiError>) -> bool {
        if seq != self.next_seq || seq <= self.applied_seq {
            tracing::debug!(seq, latest = self.next_seq, "discarding superseded message response");
            return false;
        }
        self.applied_seq = seq;
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        match outcome {
            Ok(detail) => {
                view.delivered_at = detail.delivered_at;
                view.load = LoadState::Loaded(detail);
            }
            Err(err) => {
                view.load = LoadState::Failed(err.to_string());
            }
        }
        true
    }

    /// Fire the re-delivery call for the loaded message. Only valid from
    /// the loaded state and while no send is running. Never touches the
    /// list view's result set.
    pub fn send(&mut self, client: &ApiClient, events: &mpsc::Sender<AppEvent>) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if view.sending || view.detail().is_none() {
            return;
        }
        view.sending = true;
        view.send_error = None;

        let id = view.id;
        let client = client.clone();
        let events = events.clone();
        tracing::debug!(id, "requesting re-delivery");
        tokio::spawn(async move {
            let outcome = client.redeliver(id).await;
            events
                .send(AppEvent::RedeliveryFinished { id, outcome })
                .await
                .ok();
        });
    }

    /// Apply a re-delivery completion. Responses for a message that is no
    /// longer open are dropped. A response without a confirmed success is
    /// a non-fatal no-op.
    pub fn apply_send(&mut self, id: u64, outcome: Result<bool, ApiError>) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        if view.id != id {
            return false;
        }
        view.sending = false;
        match outcome {
            Ok(true) => {
                view.delivered_at = Some(Utc::now());
                view.send_error = None;
            }
            Ok(false) => {}
            Err(err) => {
                view.send_error = Some(err.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::MessageHeader;

    fn detail(id: u64, subject: &str) -> MessageDetail {
        MessageDetail {
            id,
            header: MessageHeader {
                subject: subject.to_string(),
                ..Default::default()
            },
            body: "hello".to_string(),
            delivered_at: None,
        }
    }

    /// Open without spawning a fetch, mirroring what `open` does to state.
    fn open_view(ctrl: &mut MessageController, id: u64) -> u64 {
        ctrl.view = Some(MessageView::new(id));
        ctrl.begin()
    }

    #[test]
    fn test_load_success_populates_detail() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        assert!(matches!(ctrl.view().unwrap().load, LoadState::Loading));

        assert!(ctrl.apply_load(seq, Ok(detail(1, "hi"))));
        let view = ctrl.view().unwrap();
        assert_eq!(view.detail().unwrap().header.subject, "hi");
        assert!(view.delivered_at.is_none());
    }

    #[test]
    fn test_load_failure_sets_error_and_keeps_defaults() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        assert!(ctrl.apply_load(seq, Err(ApiError::Application("gone".to_string()))));
        let view = ctrl.view().unwrap();
        assert!(matches!(&view.load, LoadState::Failed(e) if e == "gone"));
        assert!(view.delivered_at.is_none());
    }

    #[test]
    fn test_superseded_open_response_arriving_first_is_discarded() {
        let mut ctrl = MessageController::default();
        let first = open_view(&mut ctrl, 1);
        let second = open_view(&mut ctrl, 2);

        // The superseded open's response lands before the newer one's. It
        // must not show up under the newer view.
        assert!(!ctrl.apply_load(first, Ok(detail(1, "first"))));
        let view = ctrl.view().unwrap();
        assert_eq!(view.id, 2);
        assert!(matches!(view.load, LoadState::Loading));
        assert!(ctrl.in_flight());

        assert!(ctrl.apply_load(second, Ok(detail(2, "second"))));
        let view = ctrl.view().unwrap();
        assert_eq!(view.detail().unwrap().id, 2);
        assert_eq!(view.detail().unwrap().header.subject, "second");
    }

    #[test]
    fn test_second_open_discards_first_late_response() {
        let mut ctrl = MessageController::default();
        let first = open_view(&mut ctrl, 1);
        let second = open_view(&mut ctrl, 2);

        assert!(ctrl.apply_load(second, Ok(detail(2, "second"))));
        assert!(!ctrl.apply_load(first, Ok(detail(1, "first"))));

        let view = ctrl.view().unwrap();
        assert_eq!(view.id, 2);
        assert_eq!(view.detail().unwrap().header.subject, "second");
    }

    #[test]
    fn test_loaded_delivery_timestamp_is_carried_over() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        let delivered = Some(Utc::now());
        let mut d = detail(1, "hi");
        d.delivered_at = delivered;
        ctrl.apply_load(seq, Ok(d));
        assert_eq!(ctrl.view().unwrap().delivered_at, delivered);
    }

    #[test]
    fn test_send_success_sets_delivered_now() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        ctrl.apply_load(seq, Ok(detail(1, "hi")));

        ctrl.view_mut().unwrap().sending = true;
        assert!(ctrl.apply_send(1, Ok(true)));
        let view = ctrl.view().unwrap();
        assert!(!view.sending);
        assert!(view.delivered_at.is_some());
        assert!(view.send_error.is_none());
    }

    #[test]
    fn test_send_without_confirmed_success_is_noop() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        ctrl.apply_load(seq, Ok(detail(1, "hi")));

        ctrl.view_mut().unwrap().sending = true;
        assert!(ctrl.apply_send(1, Ok(false)));
        let view = ctrl.view().unwrap();
        assert!(view.delivered_at.is_none());
        assert!(view.send_error.is_none());
    }

    #[test]
    fn test_send_failure_sets_error() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        ctrl.apply_load(seq, Ok(detail(1, "hi")));

        ctrl.view_mut().unwrap().sending = true;
        assert!(ctrl.apply_send(1, Err(ApiError::Application("smtp down".to_string()))));
        let view = ctrl.view().unwrap();
        assert_eq!(view.send_error.as_deref(), Some("smtp down"));
        assert!(view.delivered_at.is_none());
    }

    #[test]
    fn test_send_result_for_closed_message_is_dropped() {
        let mut ctrl = MessageController::default();
        let seq = open_view(&mut ctrl, 1);
        ctrl.apply_load(seq, Ok(detail(1, "hi")));
        open_view(&mut ctrl, 2);

        assert!(!ctrl.apply_send(1, Ok(true)));
        assert!(ctrl.view().unwrap().delivered_at.is_none());
    }
}
