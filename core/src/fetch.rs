//! Fetch lifecycle for the skip list of one location.
//!
//! # Design
//! `SkipFetcher` owns a `FetchState` and keeps it in step with its
//! `Location`. Every trigger (mount, location change, manual refetch) opens a
//! new cycle: the state drops back to `(empty, loading, no error)` and the
//! caller receives a `FetchTicket` holding the request to execute and a
//! monotonically increasing `RequestToken`.
//!
//! Outcomes are fed back through `complete`. Only the most recently issued
//! token may commit; anything older is discarded on arrival, so the newest
//! trigger wins regardless of the order responses come back in. Hosts that
//! can abort in-flight requests should poll `is_current` and drop superseded
//! ones.
//!
//! Cycle: `Idle -> Loading -> {Success | Failed} -> Idle`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::SkipClient;
use crate::error::{ApiError, ErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::transform::transform_skips;
use crate::transport::Transport;
use crate::types::{DisplaySkipRecord, Location};

/// Identity of one fetch cycle. Later cycles compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn from_value(value: u64) -> Self {
        Self(value)
    }
}

/// Work handed to the host for one cycle.
///
/// `request` is `None` when the cycle failed before any I/O was needed
/// (e.g. a blank postcode); the state already holds that failure.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    token: RequestToken,
    request: Option<HttpRequest>,
}

impl FetchTicket {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref()
    }
}

/// Failure stored in `FetchState`: a message for display plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ApiError> for FetchError {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState {
    pub skips: Vec<DisplaySkipRecord>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl FetchState {
    fn loading() -> Self {
        Self {
            skips: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn phase(&self) -> FetchPhase {
        if self.loading {
            FetchPhase::Loading
        } else if self.error.is_some() {
            FetchPhase::Failed
        } else {
            FetchPhase::Success
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Loading,
    Success,
    Failed,
}

/// Result of handing an outcome to `SkipFetcher::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// A newer cycle was started after this token was issued.
    Superseded,
    /// This token's cycle already settled.
    AlreadySettled,
}

pub struct SkipFetcher {
    client: SkipClient,
    location: Location,
    state: FetchState,
    latest: RequestToken,
    settled: bool,
    rejected: usize,
}

impl SkipFetcher {
    /// Create a fetcher in the loading state and open its first cycle.
    pub fn mount(client: SkipClient, location: Location) -> (Self, FetchTicket) {
        let mut fetcher = Self {
            client,
            location,
            state: FetchState::loading(),
            latest: RequestToken(0),
            settled: false,
            rejected: 0,
        };
        let ticket = fetcher.begin_cycle();
        (fetcher, ticket)
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Records the last committed response dropped as malformed.
    pub fn rejected_records(&self) -> usize {
        self.rejected
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token == self.latest && !self.settled
    }

    /// Switch location. Opens a cycle only when the value actually changed.
    pub fn set_location(&mut self, location: Location) -> Option<FetchTicket> {
        if location == self.location {
            return None;
        }
        self.location = location;
        Some(self.begin_cycle())
    }

    /// Re-run the cycle for the current location.
    pub fn refetch(&mut self) -> FetchTicket {
        self.begin_cycle()
    }

    /// Feed back the outcome of executing a ticket's request.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Commit {
        if token != self.latest {
            debug!(
                token = token.value(),
                latest = self.latest.value(),
                "discarding superseded fetch outcome"
            );
            return Commit::Superseded;
        }
        if self.settled {
            return Commit::AlreadySettled;
        }

        match outcome.and_then(|response| self.client.parse_skips_by_location(response)) {
            Ok(batch) => {
                let skips = transform_skips(&batch.records);
                info!(
                    token = token.value(),
                    count = skips.len(),
                    rejected = batch.rejected,
                    "skips loaded"
                );
                self.rejected = batch.rejected;
                self.state = FetchState {
                    skips,
                    loading: false,
                    error: None,
                };
            }
            Err(err) => self.fail(&err),
        }
        self.settled = true;
        Commit::Applied
    }

    /// Execute a ticket through `transport` and commit its outcome.
    pub fn run<T: Transport + ?Sized>(&mut self, ticket: &FetchTicket, transport: &T) -> Commit {
        let Some(request) = ticket.request() else {
            return Commit::AlreadySettled;
        };
        if ticket.token != self.latest {
            debug!(token = ticket.token.value(), "skipping superseded request");
            return Commit::Superseded;
        }
        if self.settled {
            return Commit::AlreadySettled;
        }
        let outcome = transport.execute(request);
        self.complete(ticket.token, outcome)
    }

    fn begin_cycle(&mut self) -> FetchTicket {
        self.latest = RequestToken(self.latest.0 + 1);
        self.settled = false;
        self.rejected = 0;
        self.state = FetchState::loading();
        debug!(
            token = self.latest.value(),
            postcode = %self.location.postcode,
            area = %self.location.area,
            "fetch cycle started"
        );

        match self.client.build_skips_by_location(&self.location) {
            Ok(request) => FetchTicket {
                token: self.latest,
                request: Some(request),
            },
            Err(err) => {
                self.fail(&err);
                self.settled = true;
                FetchTicket {
                    token: self.latest,
                    request: None,
                }
            }
        }
    }

    fn fail(&mut self, err: &ApiError) {
        warn!(token = self.latest.value(), error = %err, "skip fetch failed");
        self.rejected = 0;
        self.state = FetchState {
            skips: Vec::new(),
            loading: false,
            error: Some(FetchError::from(err)),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    const TWO_SKIPS: &str = r#"[
        {"id":1,"size":8,"hire_period_days":14,"price_before_vat":200,"vat":20,"allowed_on_road":true,"allows_heavy_waste":false,"postcode":"NR32","area":"Lowestoft"},
        {"id":2,"size":4,"hire_period_days":7,"price_before_vat":100,"vat":20,"allowed_on_road":true,"allows_heavy_waste":true,"postcode":"NR32","area":"Lowestoft"}
    ]"#;

    fn client() -> SkipClient {
        SkipClient::new("http://localhost:3000")
    }

    fn status(code: u16, text: &str) -> HttpResponse {
        HttpResponse {
            status: code,
            status_text: text.to_string(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Replays a canned response and records every URL it was asked for.
    struct Scripted {
        response: Result<HttpResponse, ApiError>,
        calls: Cell<usize>,
        urls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(response: Result<HttpResponse, ApiError>) -> Self {
            Self {
                response,
                calls: Cell::new(0),
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.calls.set(self.calls.get() + 1);
            self.urls.borrow_mut().push(request.url.clone());
            self.response.clone()
        }
    }

    #[test]
    fn mount_starts_loading() {
        let (fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        let state = fetcher.state();
        assert!(state.loading);
        assert!(state.skips.is_empty());
        assert!(state.error.is_none());
        assert_eq!(state.phase(), FetchPhase::Loading);
        assert!(fetcher.is_current(ticket.token()));
        assert_eq!(
            ticket.request().unwrap().url,
            "http://localhost:3000/skips/by-location?postcode=NR32&area=Lowestoft"
        );
    }

    #[test]
    fn success_populates_transformed_skips() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        let commit = fetcher.complete(ticket.token(), Ok(HttpResponse::ok(TWO_SKIPS)));
        assert_eq!(commit, Commit::Applied);

        let state = fetcher.state();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.phase(), FetchPhase::Success);
        assert_eq!(state.skips.len(), 2);
        assert_eq!(state.skips[0].name, "8 YARD SKIP CONTAINER");
        assert_eq!(state.skips[0].price, "£240.00");
        assert_eq!(state.skips[1].id, 2);
        assert!(!fetcher.is_current(ticket.token()));
    }

    #[test]
    fn server_error_clears_skips_and_stores_message() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(status(500, "Internal Server Error")));

        let state = fetcher.state();
        assert!(state.skips.is_empty());
        assert!(!state.loading);
        let error = state.error.as_ref().unwrap();
        assert_eq!(error.message, "API Error: 500 Internal Server Error");
        assert_eq!(error.kind, ErrorKind::Status);
        assert_eq!(state.phase(), FetchPhase::Failed);
    }

    #[test]
    fn empty_array_is_not_an_error() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(HttpResponse::ok("[]")));
        let state = fetcher.state();
        assert!(state.skips.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn transport_and_parse_errors_keep_their_kind() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(
            ticket.token(),
            Err(ApiError::Transport("failed to lookup address".to_string())),
        );
        let error = fetcher.state().error.clone().unwrap();
        assert_eq!(error.kind, ErrorKind::Transport);
        assert_eq!(error.message, "failed to lookup address");

        let ticket = fetcher.refetch();
        fetcher.complete(ticket.token(), Ok(HttpResponse::ok("<html>")));
        assert_eq!(fetcher.state().error.as_ref().unwrap().kind, ErrorKind::Parse);
    }

    #[test]
    fn refetch_resets_to_loading_and_replaces_data() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(HttpResponse::ok(TWO_SKIPS)));

        let ticket = fetcher.refetch();
        assert!(fetcher.state().loading);
        assert!(fetcher.state().skips.is_empty());

        fetcher.complete(ticket.token(), Ok(HttpResponse::ok("[]")));
        assert!(fetcher.state().skips.is_empty());
    }

    #[test]
    fn unchanged_location_does_not_trigger() {
        let (mut fetcher, _) = SkipFetcher::mount(client(), Location::default());
        assert!(fetcher.set_location(Location::default()).is_none());
    }

    #[test]
    fn changed_postcode_or_area_triggers_one_cycle() {
        let (mut fetcher, first) = SkipFetcher::mount(client(), Location::default());

        let second = fetcher
            .set_location(Location::new("NR32", "Oulton Broad"))
            .unwrap();
        assert!(second.token() > first.token());
        assert!(second.request().unwrap().url.ends_with("area=Oulton%20Broad"));

        let third = fetcher
            .set_location(Location::new("NR33", "Oulton Broad"))
            .unwrap();
        assert!(third.token() > second.token());
        assert_eq!(fetcher.location().postcode, "NR33");
    }

    #[test]
    fn superseded_outcome_is_discarded() {
        let (mut fetcher, stale) = SkipFetcher::mount(client(), Location::default());
        let fresh = fetcher.set_location(Location::postcode_only("NR33")).unwrap();
        assert!(!fetcher.is_current(stale.token()));

        // Newer cycle resolves first, older one trails in afterwards.
        assert_eq!(fetcher.complete(fresh.token(), Ok(HttpResponse::ok("[]"))), Commit::Applied);
        assert_eq!(
            fetcher.complete(stale.token(), Ok(HttpResponse::ok(TWO_SKIPS))),
            Commit::Superseded
        );
        assert!(fetcher.state().skips.is_empty());
        assert!(!fetcher.state().loading);
    }

    #[test]
    fn stale_outcome_does_not_end_the_current_cycle() {
        let (mut fetcher, stale) = SkipFetcher::mount(client(), Location::default());
        let _fresh = fetcher.refetch();
        fetcher.complete(stale.token(), Ok(status(503, "Service Unavailable")));
        assert!(fetcher.state().loading);
        assert!(fetcher.state().error.is_none());
    }

    #[test]
    fn second_completion_of_same_token_is_ignored() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(HttpResponse::ok(TWO_SKIPS)));
        let commit = fetcher.complete(ticket.token(), Ok(status(500, "Internal Server Error")));
        assert_eq!(commit, Commit::AlreadySettled);
        assert_eq!(fetcher.state().skips.len(), 2);
    }

    #[test]
    fn blank_postcode_fails_without_io() {
        let transport = Scripted::new(Ok(HttpResponse::ok(TWO_SKIPS)));
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::new("", "Lowestoft"));
        assert!(ticket.request().is_none());
        assert_eq!(fetcher.run(&ticket, &transport), Commit::AlreadySettled);
        assert_eq!(transport.calls.get(), 0);

        let state = fetcher.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::InvalidQuery);
    }

    #[test]
    fn run_executes_each_cycle_exactly_once() {
        let transport = Scripted::new(Ok(HttpResponse::ok(TWO_SKIPS)));
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        assert_eq!(fetcher.run(&ticket, &transport), Commit::Applied);

        let ticket = fetcher.refetch();
        assert_eq!(fetcher.run(&ticket, &transport), Commit::Applied);
        assert_eq!(transport.calls.get(), 2);
        assert_eq!(fetcher.state().skips.len(), 2);

        let urls = transport.urls.borrow();
        assert_eq!(urls[0], urls[1]);
    }

    #[test]
    fn run_skips_io_for_superseded_ticket() {
        let transport = Scripted::new(Ok(HttpResponse::ok(TWO_SKIPS)));
        let (mut fetcher, stale) = SkipFetcher::mount(client(), Location::default());
        let fresh = fetcher.refetch();

        assert_eq!(fetcher.run(&stale, &transport), Commit::Superseded);
        assert_eq!(transport.calls.get(), 0);
        assert_eq!(fetcher.run(&fresh, &transport), Commit::Applied);
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn rejected_records_are_counted() {
        let body = r#"[
            {"id":1,"size":8,"hire_period_days":14,"price_before_vat":200,"vat":20,"allowed_on_road":true,"allows_heavy_waste":false,"postcode":"NR32"},
            {"id":2,"size":"big"}
        ]"#;
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(HttpResponse::ok(body)));
        assert_eq!(fetcher.state().skips.len(), 1);
        assert_eq!(fetcher.rejected_records(), 1);
    }

    #[test]
    fn state_serializes_for_hosts() {
        let (mut fetcher, ticket) = SkipFetcher::mount(client(), Location::default());
        fetcher.complete(ticket.token(), Ok(status(500, "Internal Server Error")));
        let json = serde_json::to_value(fetcher.state()).unwrap();
        assert_eq!(json["loading"], false);
        assert_eq!(json["skips"], serde_json::json!([]));
        assert_eq!(json["error"]["kind"], "status");
        assert_eq!(json["error"]["message"], "API Error: 500 Internal Server Error");
    }
}
