// Debounces conversation changes into "save now" ticks.
//
// The task never touches the conversation itself: it only tells the owner
// when a revision has stayed unchanged for the quiet period.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct AutoSaver {
    changes: watch::Sender<u64>,
    due: mpsc::Receiver<u64>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    pub fn spawn(quiet: Duration) -> Self {
        let (changes, changes_rx) = watch::channel(0);
        let (due_tx, due) = mpsc::channel(1);
        let task = tokio::spawn(run(changes_rx, due_tx, quiet));
        Self { changes, due, task }
    }

    /// Reports the current revision; each new value restarts the quiet period.
    pub fn notify(&self, revision: u64) {
        self.changes.send_if_modified(|current| {
            if *current == revision {
                false
            } else {
                *current = revision;
                true
            }
        });
    }

    /// Resolves with the revision that went quiet.
    pub async fn due(&mut self) -> Option<u64> {
        self.due.recv().await
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(mut changes: watch::Receiver<u64>, due: mpsc::Sender<u64>, quiet: Duration) {
    loop {
        if changes.changed().await.is_err() {
            return;
        }
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Another change: wait a full quiet period again.
                }
                _ = tokio::time::sleep(quiet) => {
                    let revision = *changes.borrow_and_update();
                    debug!(revision, "Conversation quiet, auto-saving");
                    if due.send(revision).await.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}
