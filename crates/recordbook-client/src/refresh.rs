//! The refresh loop driving a [`ClientView`].
//!
//! One task owns the view. It reloads on start, whenever the page or the
//! search term changes, after a successful submit, and unconditionally on
//! every timer tick. Commands and ticks are handled one at a time, so the
//! last reload to finish is what the view shows. Every state change is
//! published on a `watch` channel for the front end to draw, including the
//! in-flight loading and submitting states.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::form::FormField;
use crate::state::ClientView;

/// User actions sent to the refresh loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetPage(u32),
    NextPage,
    PrevPage,
    Search(String),
    Edit(FormField, String),
    Submit,
    Reload,
}

/// Front-end side of a running refresh loop.
#[derive(Debug)]
pub struct ViewHandle {
    commands: mpsc::Sender<ViewCommand>,
    snapshots: watch::Receiver<ClientView>,
}

impl ViewHandle {
    /// Queue a command. Returns `false` once the loop has stopped.
    pub async fn send(&self, command: ViewCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// A receiver that sees every published view.
    pub fn subscribe(&self) -> watch::Receiver<ClientView> {
        self.snapshots.clone()
    }

    /// The most recently published view.
    pub fn current(&self) -> ClientView {
        self.snapshots.borrow().clone()
    }
}

/// Start the loop. It stops when the [`ViewHandle`] is dropped.
pub fn spawn(api: ApiClient, view: ClientView, every: Duration) -> (ViewHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (snap_tx, snap_rx) = watch::channel(view.clone());

    let task = tokio::spawn(run(api, view, every, cmd_rx, snap_tx));

    (
        ViewHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
        },
        task,
    )
}

async fn run(
    api: ApiClient,
    mut view: ClientView,
    every: Duration,
    mut commands: mpsc::Receiver<ViewCommand>,
    snapshots: watch::Sender<ClientView>,
) {
    info!(api = api.base_url(), every_secs = every.as_secs(), "refresh loop started");

    reload(&api, &mut view, &snapshots).await;
    snapshots.send_replace(view.clone());

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("auto-refresh");
                reload(&api, &mut view, &snapshots).await;
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                handle(&api, &mut view, command, &snapshots).await;
            }
        }
        snapshots.send_replace(view.clone());
    }

    info!("refresh loop stopped");
}

async fn handle(
    api: &ApiClient,
    view: &mut ClientView,
    command: ViewCommand,
    snapshots: &watch::Sender<ClientView>,
) {
    let due = match command {
        ViewCommand::SetPage(page) => view.set_page(page),
        ViewCommand::NextPage => view.next_page(),
        ViewCommand::PrevPage => view.prev_page(),
        ViewCommand::Search(term) => view.set_search(term),
        ViewCommand::Edit(field, value) => {
            view.edit(field, value);
            false
        }
        ViewCommand::Submit => {
            let Some(input) = view.begin_submit() else {
                return;
            };
            snapshots.send_replace(view.clone());
            let result = api.create(&input).await;
            view.finish_submit(result)
        }
        ViewCommand::Reload => true,
    };

    if due {
        reload(api, view, snapshots).await;
    }
}

/// Publish the loading state, then fetch the page.
async fn reload(api: &ApiClient, view: &mut ClientView, snapshots: &watch::Sender<ClientView>) {
    view.is_loading = true;
    snapshots.send_replace(view.clone());
    view.reload(api).await;
}
