use std::collections::VecDeque;

use crate::client::FetchError;
use crate::config::AppConfig;
use crate::controller::{FetchTicket, ResourceListController};
use crate::record::Record;
use crate::resources::Resource;
use crate::views::{DerivedView, derive_all};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    List(Resource),
}

pub struct AppState {
    pub screen: Screen,
    pub config: AppConfig,
    pub controller: Option<ResourceListController>,
    pub rows: Vec<DerivedView>,
    pub selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

pub enum Delta {
    Fetched {
        resource: Resource,
        ticket: FetchTicket,
        result: Result<Vec<Record>, FetchError>,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    Fetch {
        resource: Resource,
        url: String,
        ticket: FetchTicket,
    },
    Shutdown,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            screen: Screen::Home,
            config,
            controller: None,
            rows: Vec::new(),
            selected: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn current_resource(&self) -> Option<Resource> {
        match self.screen {
            Screen::Home => None,
            Screen::List(resource) => Some(resource),
        }
    }

    /// Tears down the current view's controller and mounts a fresh one for
    /// `resource`. Returns the fetch to dispatch.
    pub fn open(&mut self, resource: Resource) -> Option<ProviderCommand> {
        self.unmount();
        let mut controller = ResourceListController::new(resource, self.config.endpoint(resource));
        let command = fetch_command(&mut controller);
        self.controller = Some(controller);
        self.screen = Screen::List(resource);
        command
    }

    pub fn go_home(&mut self) {
        self.unmount();
        self.screen = Screen::Home;
    }

    pub fn refresh(&mut self) -> Option<ProviderCommand> {
        let controller = self.controller.as_mut()?;
        let command = fetch_command(controller);
        if command.is_some() {
            self.rows.clear();
            self.selected = 0;
        }
        command
    }

    fn unmount(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.teardown();
        }
        self.rows.clear();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(self.rows.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&DerivedView> {
        self.rows.get(self.selected)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn rebuild_rows(&mut self) {
        self.rows = match &self.controller {
            Some(controller) => derive_all(controller.resource(), controller.records()),
            None => Vec::new(),
        };
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }
}

fn fetch_command(controller: &mut ResourceListController) -> Option<ProviderCommand> {
    let ticket = controller.begin()?;
    Some(ProviderCommand::Fetch {
        resource: controller.resource(),
        url: controller.endpoint().to_string(),
        ticket,
    })
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Fetched {
            resource,
            ticket,
            result,
        } => {
            let applied = state
                .controller
                .as_mut()
                .is_some_and(|controller| controller.complete(ticket, result));
            if applied {
                state.rebuild_rows();
            } else {
                state.push_log(format!("[INFO] {resource} - Discarded late response"));
            }
        }
        Delta::Log(line) => state.push_log(line),
    }
}
