use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use octofit_terminal::client::{FetchError, RawResponse, ResourceClient, Transport};
use octofit_terminal::config::AppConfig;
use octofit_terminal::controller::{ResourceListController, ResourceListState, StatusKind};
use octofit_terminal::derive::DifficultyClass;
use octofit_terminal::observer::FetchObserver;
use octofit_terminal::provider::spawn_provider;
use octofit_terminal::resources::Resource;
use octofit_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};
use octofit_terminal::views::{DerivedView, derive_all};

enum Canned {
    Body(u16, &'static str),
    Refused,
}

/// Serves canned responses by URL and counts requests.
#[derive(Clone)]
struct FakeTransport {
    routes: Arc<HashMap<String, Canned>>,
    hits: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl FakeTransport {
    fn new(routes: Vec<(&str, Canned)>) -> Self {
        Self {
            routes: Arc::new(
                routes
                    .into_iter()
                    .map(|(url, canned)| (url.to_string(), canned))
                    .collect(),
            ),
            hits: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.hits.lock().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        match self.routes.get(url) {
            Some(Canned::Body(status, body)) => Ok(RawResponse {
                status: *status,
                body: body.to_string(),
            }),
            Some(Canned::Refused) | None => Err(FetchError::network(
                url,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}

const WORKOUTS_URL: &str = "http://api.test/api/workouts/";
const USERS_URL: &str = "http://api.test/api/users/";

#[test]
fn end_to_end_envelope_to_loaded_workout() {
    let transport = FakeTransport::new(vec![(
        WORKOUTS_URL,
        Canned::Body(
            200,
            r#"{"results":[{"id":1,"difficulty":"Hard","duration":30}]}"#,
        ),
    )]);
    let client = ResourceClient::new(transport.clone());
    let mut controller = ResourceListController::new(Resource::Workouts, WORKOUTS_URL);

    assert!(controller.run(&client));
    assert_eq!(controller.status(), StatusKind::Loaded);
    assert_eq!(controller.records().len(), 1);
    assert_eq!(transport.hits(), vec![WORKOUTS_URL.to_string()]);

    let rows = derive_all(Resource::Workouts, controller.records());
    let DerivedView::Workout(workout) = &rows[0] else {
        panic!("expected workout row");
    };
    assert_eq!(workout.difficulty_class, DifficultyClass::Hard);
    assert_eq!(workout.difficulty_class.class_tag(), "difficulty-hard");
    assert_eq!(workout.duration, "30");
}

#[test]
fn status_and_decode_failures_become_messages() {
    let transport = FakeTransport::new(vec![
        (WORKOUTS_URL, Canned::Body(503, "Service Unavailable")),
        (USERS_URL, Canned::Body(200, "<!doctype html>")),
    ]);
    let client = ResourceClient::new(transport);

    let mut workouts = ResourceListController::new(Resource::Workouts, WORKOUTS_URL);
    workouts.run(&client);
    assert_eq!(
        workouts.state(),
        &ResourceListState::Failed("HTTP error! status: 503".to_string())
    );

    let mut users = ResourceListController::new(Resource::Users, USERS_URL);
    users.run(&client);
    assert_eq!(users.status(), StatusKind::Failed);
    assert!(users.error_message().is_some_and(|m| m.starts_with("invalid JSON")));
    assert!(users.records().is_empty());
}

#[test]
fn failed_refresh_does_not_keep_stale_records() {
    let ok = FakeTransport::new(vec![(USERS_URL, Canned::Body(200, r#"[{"id":1},{"id":2}]"#))]);
    let down = FakeTransport::new(vec![(USERS_URL, Canned::Refused)]);

    let mut controller = ResourceListController::new(Resource::Users, USERS_URL);
    controller.run(&ResourceClient::new(ok));
    assert_eq!(controller.records().len(), 2);

    controller.run(&ResourceClient::new(down));
    assert_eq!(controller.status(), StatusKind::Failed);
    assert!(controller.records().is_empty());
    assert!(controller.error_message().is_some_and(|m| !m.is_empty()));
}

#[derive(Clone, Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl FetchObserver for RecordingObserver {
    fn on_request(&self, resource: Resource, url: &str) {
        self.events.lock().unwrap().push(format!("request {resource} {url}"));
    }

    fn on_loaded(&self, resource: Resource, count: usize) {
        self.events.lock().unwrap().push(format!("loaded {resource} {count}"));
    }

    fn on_failed(&self, resource: Resource, error: &FetchError) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed {resource} {:?}", error.status()));
    }
}

#[test]
fn observer_sees_each_fetch_once() {
    let transport = FakeTransport::new(vec![
        (USERS_URL, Canned::Body(200, "[]")),
        (WORKOUTS_URL, Canned::Body(404, "")),
    ]);
    let observer = RecordingObserver::default();
    let client = ResourceClient::new(transport).with_observer(observer.clone());

    let _ = client.fetch(Resource::Users, USERS_URL);
    let _ = client.fetch(Resource::Workouts, WORKOUTS_URL);

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            format!("request Users {USERS_URL}"),
            "loaded Users 0".to_string(),
            format!("request Workouts {WORKOUTS_URL}"),
            "failed Workouts Some(404)".to_string(),
        ]
    );
}

#[test]
fn provider_thread_replies_with_matching_ticket() {
    let transport = FakeTransport::new(vec![(USERS_URL, Canned::Body(200, r#"{"results":[{"id":7}]}"#))]);
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = spawn_provider(ResourceClient::new(transport), tx, cmd_rx);

    let mut controller = ResourceListController::new(Resource::Users, USERS_URL);
    let ticket = controller.begin().expect("ticket");
    cmd_tx
        .send(ProviderCommand::Fetch {
            resource: Resource::Users,
            url: USERS_URL.to_string(),
            ticket,
        })
        .unwrap();

    let delta = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("provider should reply");
    let Delta::Fetched {
        ticket: got,
        result,
        ..
    } = delta
    else {
        panic!("expected fetched delta");
    };
    assert_eq!(got, ticket);
    assert!(controller.complete(got, result));
    assert_eq!(controller.records().len(), 1);

    cmd_tx.send(ProviderCommand::Shutdown).unwrap();
    worker.join().expect("provider exits cleanly");
}

#[test]
fn provider_result_after_teardown_is_ignored() {
    let transport = FakeTransport::new(vec![(USERS_URL, Canned::Body(200, r#"[{"id":1}]"#))]);
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = spawn_provider(ResourceClient::new(transport), tx, cmd_rx);

    let mut controller = ResourceListController::new(Resource::Users, USERS_URL);
    let ticket = controller.begin().unwrap();
    cmd_tx
        .send(ProviderCommand::Fetch {
            resource: Resource::Users,
            url: USERS_URL.to_string(),
            ticket,
        })
        .unwrap();
    controller.teardown();
    let before = controller.state().clone();

    let Ok(Delta::Fetched { ticket, result, .. }) = rx.recv_timeout(Duration::from_secs(5)) else {
        panic!("expected fetched delta");
    };
    assert!(!controller.complete(ticket, result));
    assert_eq!(controller.state(), &before);

    drop(cmd_tx);
    worker.join().expect("provider exits when commands close");
}

const TAB_ORDER: [Resource; 5] = [
    Resource::Activities,
    Resource::Leaderboard,
    Resource::Teams,
    Resource::Users,
    Resource::Workouts,
];

fn slow_local_transport(delay: Duration) -> FakeTransport {
    let urls: Vec<String> = TAB_ORDER
        .iter()
        .map(|resource| format!("http://localhost:8000/api/{}", resource.path()))
        .collect();
    FakeTransport::new(
        urls.iter()
            .map(|url| (url.as_str(), Canned::Body(200, r#"[{"id":1,"name":"x"}]"#)))
            .collect(),
    )
    .with_delay(delay)
}

fn wait_for_fetched(rx: &mpsc::Receiver<Delta>, state: &mut AppState) {
    loop {
        let delta = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("provider should reply");
        let fetched = matches!(delta, Delta::Fetched { .. });
        apply_delta(state, delta);
        if fetched {
            return;
        }
    }
}

#[test]
fn rapid_tab_switches_only_fetch_the_live_view() {
    let transport = slow_local_transport(Duration::from_millis(50));
    let mut state = AppState::new(AppConfig::from_lookup(|_| None).expect("default config"));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    for resource in TAB_ORDER {
        cmd_tx.send(state.open(resource).expect("fetch")).unwrap();
    }
    let worker = spawn_provider(ResourceClient::new(transport.clone()), tx, cmd_rx);

    wait_for_fetched(&rx, &mut state);
    assert_eq!(
        transport.hits(),
        vec!["http://localhost:8000/api/workouts/".to_string()]
    );
    let controller = state.controller.as_ref().unwrap();
    assert_eq!(controller.resource(), Resource::Workouts);
    assert_eq!(controller.status(), StatusKind::Loaded);
    assert_eq!(state.rows.len(), 1);
    assert!(state.logs.iter().any(|line| line.contains("Skipped superseded fetch")));

    cmd_tx.send(ProviderCommand::Shutdown).unwrap();
    worker.join().expect("provider exits cleanly");
}

#[test]
fn switches_during_a_slow_fetch_collapse_to_the_newest() {
    let transport = slow_local_transport(Duration::from_millis(300));
    let mut state = AppState::new(AppConfig::from_lookup(|_| None).expect("default config"));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = spawn_provider(ResourceClient::new(transport.clone()), tx, cmd_rx);

    cmd_tx.send(state.open(TAB_ORDER[0]).unwrap()).unwrap();
    for _ in 0..200 {
        if !transport.hits().is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    for resource in &TAB_ORDER[1..] {
        cmd_tx.send(state.open(*resource).unwrap()).unwrap();
    }

    // The in-flight activities reply is stale; the next one is live.
    wait_for_fetched(&rx, &mut state);
    wait_for_fetched(&rx, &mut state);
    assert_eq!(
        transport.hits(),
        vec![
            "http://localhost:8000/api/activities/".to_string(),
            "http://localhost:8000/api/workouts/".to_string(),
        ]
    );
    assert_eq!(
        state.controller.as_ref().map(|c| c.status()),
        Some(StatusKind::Loaded)
    );

    drop(cmd_tx);
    worker.join().expect("provider exits when commands close");
}

#[test]
fn queued_shutdown_wins_over_pending_fetches() {
    let transport = slow_local_transport(Duration::ZERO);
    let mut state = AppState::new(AppConfig::from_lookup(|_| None).expect("default config"));
    let (tx, _rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    cmd_tx.send(state.open(Resource::Teams).unwrap()).unwrap();
    cmd_tx.send(ProviderCommand::Shutdown).unwrap();
    cmd_tx.send(state.open(Resource::Users).unwrap()).unwrap();
    let worker = spawn_provider(ResourceClient::new(transport.clone()), tx, cmd_rx);

    worker.join().expect("provider exits on shutdown");
    assert!(transport.hits().is_empty());
}
