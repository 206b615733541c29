//! Fan-out of mail files over independent connections.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{config::Settings, internal, smtp::send_messages};

/// Sessions running in the background.
///
/// Dropping a `Dispatch` detaches its sessions; [`Dispatch::join`] waits for
/// them instead.
#[derive(Debug, Default)]
pub struct Dispatch {
    sessions: Vec<JoinHandle<()>>,
}

impl Dispatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Take over the sessions of `other`.
    pub fn merge(&mut self, other: Self) {
        self.sessions.extend(other.sessions);
    }

    /// Wait for every session to finish.
    pub async fn join(self) {
        for result in join_all(self.sessions).await {
            if let Err(err) = result {
                internal!(level = ERROR, "Session task failed: {err}");
            }
        }
    }
}

/// Spawn one session per mail file, each on its own connection.
///
/// Sessions share nothing; each logs its own failure under a `session` span
/// carrying a numeric id. Must be called from within a tokio runtime.
pub fn parallel(settings: &Arc<Settings>) -> Dispatch {
    let sessions = settings
        .eml_files
        .iter()
        .enumerate()
        .map(|(idx, file)| {
            let id = idx + 1;
            let settings = Arc::clone(settings);
            let files = vec![file.clone()];

            tokio::spawn(
                async move {
                    if let Err(err) = send_messages(settings, &files).await {
                        internal!(level = ERROR, "error: {err}");
                    }
                }
                .instrument(tracing::info_span!(target: "sendeml", "session", id)),
            )
        })
        .collect();

    Dispatch { sessions }
}
