use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    config::{InvalidMailPolicy, Settings},
    error::SendError,
    internal,
    mail::replace_mail,
    outgoing,
    traits::exchange::Exchange,
};

use super::command::{Command, EHLO_DOMAIN};

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum State {
    #[default]
    Connected,
    /// EHLO accepted, no message sent yet.
    Greeted,
    /// At least one message went through; the next one starts with RSET.
    Sent,
    Quit,
}

/// Drives one SMTP connection through EHLO, one transaction per mail file,
/// and QUIT.
pub struct Session<E: Exchange> {
    exchange: E,
    settings: Arc<Settings>,
    state: State,
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

impl<E: Exchange> Session<E> {
    pub fn create(exchange: E, settings: Arc<Settings>) -> Self {
        Self {
            exchange,
            settings,
            state: State::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Send every file in `files`, in order, then QUIT.
    ///
    /// The connection is closed whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the first error that ended the session. Missing files are
    /// skipped and do not count as errors.
    pub async fn run(mut self, files: &[PathBuf]) -> Result<(), SendError> {
        let result = self.run_inner(files).await;

        self.exchange.close().await;
        internal!("Connection closed");

        result
    }

    async fn run_inner(&mut self, files: &[PathBuf]) -> Result<(), SendError> {
        self.exchange.recv().await?;

        self.send(Command::Ehlo(EHLO_DOMAIN)).await?;
        self.state = State::Greeted;

        for file in files {
            self.send_message(file).await?;
        }

        self.send(Command::Quit).await?;
        self.state = State::Quit;

        Ok(())
    }

    async fn send(&mut self, command: Command<'_>) -> Result<String, SendError> {
        self.exchange.send(&command.to_string()).await
    }

    async fn send_message(&mut self, file: &Path) -> Result<(), SendError> {
        if !is_file(file).await {
            internal!(
                level = WARN,
                "{}: EML file does not exist",
                file.display()
            );
            return Ok(());
        }

        if self.state == State::Sent {
            internal!(level = INFO, "---");
            self.send(Command::Rset).await?;
        }

        let settings = Arc::clone(&self.settings);
        self.send(Command::MailFrom(&settings.from_address)).await?;
        self.send_rcpt_to(&settings.to_addresses).await?;
        self.send(Command::Data).await?;
        self.send_mail(file).await?;
        self.send(Command::CrlfDot).await?;

        self.state = State::Sent;

        Ok(())
    }

    /// Every recipient is tried, a refused one does not stop the others. If
    /// none is accepted the server refuses DATA.
    async fn send_rcpt_to(&mut self, addresses: &[String]) -> Result<(), SendError> {
        for address in addresses {
            match self.send(Command::RcptTo(address)).await {
                Ok(_) => {}
                Err(SendError::NegativeReply(reply)) => {
                    internal!(level = WARN, "{address}: recipient refused: {reply}");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Write the mail content, refreshed as configured, into the open DATA
    /// stream. Lines starting with a dot are not escaped.
    async fn send_mail(&mut self, file: &Path) -> Result<(), SendError> {
        outgoing!(level = INFO, "send: {}", file.display());

        let bytes = tokio::fs::read(file)
            .await
            .map_err(|source| SendError::ReadMail {
                file: file.to_path_buf(),
                source,
            })?;

        let mail = match replace_mail(
            &bytes,
            self.settings.update_date,
            self.settings.update_message_id,
        ) {
            Ok(mail) => mail,
            Err(source) => match self.settings.invalid_mail {
                InvalidMailPolicy::Fallback => {
                    internal!(
                        level = WARN,
                        "{}: {source}: sending it unmodified",
                        file.display()
                    );
                    Cow::Borrowed(bytes.as_slice())
                }
                InvalidMailPolicy::Abort => {
                    return Err(SendError::InvalidMail {
                        file: file.to_path_buf(),
                        source,
                    });
                }
            },
        };

        self.exchange.write_raw(&mail).await
    }
}
