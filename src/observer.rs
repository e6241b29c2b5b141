use std::sync::mpsc::Sender;

use crate::client::FetchError;
use crate::resources::Resource;
use crate::state::Delta;

/// Receives fetch lifecycle notifications. Implementations must not block.
pub trait FetchObserver: Send {
    fn on_request(&self, _resource: Resource, _url: &str) {}
    fn on_loaded(&self, _resource: Resource, _count: usize) {}
    fn on_failed(&self, _resource: Resource, _error: &FetchError) {}
}

pub struct NoopObserver;

impl FetchObserver for NoopObserver {}

/// Forwards fetch notifications to the console pane as `Delta::Log` lines.
pub struct LogObserver {
    tx: Sender<Delta>,
}

impl LogObserver {
    pub fn new(tx: Sender<Delta>) -> Self {
        Self { tx }
    }

    fn log(&self, line: String) {
        let _ = self.tx.send(Delta::Log(line));
    }
}

impl FetchObserver for LogObserver {
    fn on_request(&self, resource: Resource, url: &str) {
        self.log(format!("[INFO] {resource} - Fetching from: {url}"));
    }

    fn on_loaded(&self, resource: Resource, count: usize) {
        self.log(format!("[INFO] {resource} - Fetched {count} records"));
    }

    fn on_failed(&self, resource: Resource, error: &FetchError) {
        self.log(format!("[WARN] {resource} - Error fetching data: {error}"));
    }
}
