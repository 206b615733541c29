pub mod command;
pub mod connection;
pub mod reply;
pub mod session;

use std::{path::PathBuf, sync::Arc};

use crate::{config::Settings, error::SendError};

use self::{connection::Connection, session::Session};

/// Open one connection to the configured server and send `files` over it.
///
/// # Errors
///
/// Returns an error if the connection cannot be opened or the session ends
/// early; see [`Session::run`].
pub async fn send_messages(settings: Arc<Settings>, files: &[PathBuf]) -> Result<(), SendError> {
    let connection = Connection::connect(&settings.address()).await?;

    Session::create(connection, settings).run(files).await
}
