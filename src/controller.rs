//! Fetch-on-mount lifecycle for one list view.
//!
//! A controller moves `Idle -> Loading -> Loaded | Failed`. Each fetch it
//! starts is identified by a [`FetchTicket`]; an outcome is applied only when
//! it carries the ticket of the fetch currently in flight and the controller
//! has not been torn down. Late results for superseded fetches or released
//! views are dropped without touching state.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::client::{FetchError, ResourceClient, Transport};
use crate::record::Record;
use crate::resources::Resource;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Identifies one fetch of one controller instance. Tickets from different
/// instances never compare equal, even for the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FetchTicket {
    instance: u64,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceListState {
    Idle,
    Loading,
    Loaded(Vec<Record>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Read-only snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceListView<'a> {
    pub resource: Resource,
    pub state: StatusKind,
    pub records: &'a [Record],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'a str>,
}

#[derive(Debug)]
pub struct ResourceListController {
    resource: Resource,
    endpoint: String,
    state: ResourceListState,
    instance: u64,
    in_flight: Option<FetchTicket>,
    next_seq: u64,
    torn_down: bool,
}

impl ResourceListController {
    pub fn new(resource: Resource, endpoint: impl Into<String>) -> Self {
        Self {
            resource,
            endpoint: endpoint.into(),
            state: ResourceListState::Idle,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            in_flight: None,
            next_seq: 0,
            torn_down: false,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Starts a fetch. Returns `None` while another fetch is in flight or
    /// after teardown.
    pub fn begin(&mut self) -> Option<FetchTicket> {
        if self.torn_down || self.in_flight.is_some() {
            return None;
        }
        self.next_seq += 1;
        let ticket = FetchTicket {
            instance: self.instance,
            seq: self.next_seq,
        };
        self.in_flight = Some(ticket);
        self.state = ResourceListState::Loading;
        Some(ticket)
    }

    /// User-triggered re-fetch from a terminal state.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.begin()
    }

    /// Applies a fetch outcome. Returns whether state changed.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<Record>, FetchError>,
    ) -> bool {
        if self.torn_down || self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.state = match outcome {
            Ok(records) => ResourceListState::Loaded(records),
            Err(err) => ResourceListState::Failed(failure_message(&err)),
        };
        true
    }

    /// Releases the controller. Every later completion is ignored.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
    }

    /// Synchronous mount: begin, fetch, complete.
    pub fn run<T: Transport>(&mut self, client: &ResourceClient<T>) -> bool {
        let Some(ticket) = self.begin() else {
            return false;
        };
        let outcome = client.fetch(self.resource, &self.endpoint);
        self.complete(ticket, outcome)
    }

    pub fn state(&self) -> &ResourceListState {
        &self.state
    }

    pub fn status(&self) -> StatusKind {
        match self.state {
            ResourceListState::Idle => StatusKind::Idle,
            ResourceListState::Loading => StatusKind::Loading,
            ResourceListState::Loaded(_) => StatusKind::Loaded,
            ResourceListState::Failed(_) => StatusKind::Failed,
        }
    }

    pub fn records(&self) -> &[Record] {
        match &self.state {
            ResourceListState::Loaded(records) => records,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ResourceListState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ResourceListState::Loading)
    }

    /// Loaded successfully but with nothing to show.
    pub fn is_empty_loaded(&self) -> bool {
        matches!(&self.state, ResourceListState::Loaded(records) if records.is_empty())
    }

    pub fn view(&self) -> ResourceListView<'_> {
        ResourceListView {
            resource: self.resource,
            state: self.status(),
            records: self.records(),
            error_message: self.error_message(),
        }
    }
}

fn failure_message(err: &FetchError) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        "Failed to load data".to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn controller() -> ResourceListController {
        ResourceListController::new(Resource::Users, "http://localhost:8000/api/users/")
    }

    #[test]
    fn starts_idle_and_enters_loading_on_begin() {
        let mut ctl = controller();
        assert_eq!(ctl.state(), &ResourceListState::Idle);
        assert!(ctl.begin().is_some());
        assert!(ctl.is_loading());
    }

    #[test]
    fn second_begin_while_in_flight_is_refused() {
        let mut ctl = controller();
        let ticket = ctl.begin().unwrap();
        assert!(ctl.begin().is_none());
        assert!(ctl.complete(ticket, Ok(vec![json!({"id": 1})])));
        assert_eq!(ctl.records().len(), 1);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut ctl = controller();
        let first = ctl.begin().unwrap();
        assert!(ctl.complete(first, Ok(vec![])));
        let second = ctl.refresh().unwrap();
        assert!(!ctl.complete(first, Ok(vec![json!({"id": 9})])));
        assert!(ctl.is_loading());
        assert!(ctl.complete(second, Ok(vec![json!({"id": 1}), json!({"id": 2})])));
        assert_eq!(ctl.records().len(), 2);
    }

    #[test]
    fn failure_drops_previous_records() {
        let mut ctl = controller();
        let ticket = ctl.begin().unwrap();
        ctl.complete(ticket, Ok(vec![json!({"id": 1})]));
        let ticket = ctl.refresh().unwrap();
        assert!(ctl.records().is_empty());
        ctl.complete(ticket, Err(FetchError::HttpStatus { status: 500 }));
        assert_eq!(ctl.error_message(), Some("HTTP error! status: 500"));
        assert!(ctl.records().is_empty());
    }

    #[test]
    fn teardown_blocks_late_results_and_new_fetches() {
        let mut ctl = controller();
        let ticket = ctl.begin().unwrap();
        ctl.teardown();
        assert!(!ctl.complete(ticket, Ok(vec![json!({"id": 1})])));
        assert!(ctl.is_loading());
        assert!(ctl.records().is_empty());
        assert!(ctl.begin().is_none());
    }

    #[test]
    fn tickets_do_not_cross_instances() {
        let mut old = controller();
        let old_ticket = old.begin().unwrap();
        old.teardown();
        let mut fresh = controller();
        fresh.begin().unwrap();
        assert!(!fresh.complete(old_ticket, Ok(vec![json!({"id": 1})])));
        assert!(fresh.is_loading());
    }

    #[test]
    fn view_serializes_status_and_records() {
        let mut ctl = controller();
        let ticket = ctl.begin().unwrap();
        ctl.complete(ticket, Ok(vec![json!({"id": 3})]));
        let value = serde_json::to_value(ctl.view()).unwrap();
        assert_eq!(value["state"], "loaded");
        assert_eq!(value["resource"], "users");
        assert_eq!(value["records"][0]["id"], 3);
        assert!(value.get("error_message").is_none());
    }
}
