use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::client::{ResourceClient, Transport};
use crate::controller::FetchTicket;
use crate::resources::Resource;
use crate::state::{Delta, ProviderCommand};

struct PendingFetch {
    resource: Resource,
    url: String,
    ticket: FetchTicket,
}

/// Runs fetches on a background thread, one at a time. Only one view is
/// mounted at a time, so fetches queued behind a newer one are skipped.
/// The thread exits on `Shutdown` or when either channel closes.
pub fn spawn_provider<T>(
    client: ResourceClient<T>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    T: Transport + 'static,
{
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let Some(PendingFetch {
                resource,
                url,
                ticket,
            }) = newest_fetch(cmd, &cmd_rx, &tx)
            else {
                break;
            };
            let result = client.fetch(resource, &url);
            if tx
                .send(Delta::Fetched {
                    resource,
                    ticket,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    })
}

/// Folds `first` and everything already queued into the newest fetch.
/// `None` means shut down.
fn newest_fetch(
    first: ProviderCommand,
    cmd_rx: &Receiver<ProviderCommand>,
    tx: &Sender<Delta>,
) -> Option<PendingFetch> {
    let mut pending: Option<PendingFetch> = None;
    for cmd in std::iter::once(first).chain(cmd_rx.try_iter()) {
        match cmd {
            ProviderCommand::Fetch {
                resource,
                url,
                ticket,
            } => {
                if let Some(skipped) = pending.replace(PendingFetch {
                    resource,
                    url,
                    ticket,
                }) {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] {} - Skipped superseded fetch",
                        skipped.resource
                    )));
                }
            }
            ProviderCommand::Shutdown => return None,
        }
    }
    pending
}
