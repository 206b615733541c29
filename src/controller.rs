use std::sync::Arc;

use crate::{
    config::Settings,
    dispatch::{self, Dispatch},
    internal,
    smtp::send_messages,
};

/// Runs one settings file worth of sending.
pub struct Controller {
    settings: Arc<Settings>,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Whether `run` will fan the files out over separate connections.
    pub fn is_parallel(&self) -> bool {
        self.settings.use_parallel && self.settings.eml_files.len() > 1
    }

    /// Send every configured file.
    ///
    /// In parallel mode the sessions are left running and the returned
    /// [`Dispatch`] tracks them. Otherwise all files go over one connection
    /// before this returns, and the returned handle is already complete.
    /// Session failures are logged, not returned.
    pub async fn run(self) -> Dispatch {
        if self.is_parallel() {
            internal!(
                level = DEBUG,
                "Sending {} files in parallel",
                self.settings.eml_files.len()
            );
            return dispatch::parallel(&self.settings);
        }

        let files = self.settings.eml_files.clone();
        if let Err(err) = send_messages(self.settings, &files).await {
            internal!(level = ERROR, "error: {err}");
        }

        Dispatch::default()
    }
}
