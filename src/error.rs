//! Error types for sendeml.
//!
//! Configuration problems, malformed mail files and SMTP session failures are
//! kept apart so callers can tell a bad input from a refusing server.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The header/body boundary (`CRLFCRLF`) could not be found in a mail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Invalid mail: header/body boundary not found")]
pub struct MailFormatError;

/// Errors raised while loading a settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file does not exist.
    #[error("Json file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The settings file is not valid JSON, misses a key, or has a value of
    /// the wrong type.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed fine but is unusable.
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors that end an SMTP session.
#[derive(Debug, Error)]
pub enum SendError {
    /// I/O error on the connection.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The server closed the connection before a final reply line arrived.
    #[error("Connection closed by foreign host")]
    ConnectionClosed,

    /// The server answered with a code other than 2xx or 3xx. Holds the
    /// literal final reply line.
    #[error("{0}")]
    NegativeReply(String),

    /// A mail had no header/body boundary and the session was configured to
    /// abort on that.
    #[error("{}: {source}", file.display())]
    InvalidMail {
        file: PathBuf,
        source: MailFormatError,
    },

    /// A mail file existed but could not be read.
    #[error("{}: {source}", file.display())]
    ReadMail { file: PathBuf, source: io::Error },
}

impl SendError {
    /// Returns the reply line if the server refused a command.
    #[must_use]
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::NegativeReply(line) => Some(line),
            _ => None,
        }
    }

    /// Returns `true` if the error came from the mail file rather than the
    /// server or the network.
    #[must_use]
    pub const fn is_mail_error(&self) -> bool {
        matches!(self, Self::InvalidMail { .. } | Self::ReadMail { .. })
    }
}
