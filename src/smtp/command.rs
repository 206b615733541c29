use core::fmt::{self, Display, Formatter};

use crate::mail::CRLF;

/// Host name announced in EHLO.
pub const EHLO_DOMAIN: &str = "localhost";

/// The commands a sending session issues, in the form they go on the wire
/// (without the trailing CRLF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Ehlo(&'a str),
    Rset,
    MailFrom(&'a str),
    RcptTo(&'a str),
    Data,
    /// Ends the DATA content: CRLF, then a line holding a single dot.
    CrlfDot,
    Quit,
}

impl Display for Command<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(domain) => write!(fmt, "EHLO {domain}"),
            Self::Rset => fmt.write_str("RSET"),
            Self::MailFrom(address) => write!(fmt, "MAIL FROM: <{address}>"),
            Self::RcptTo(address) => write!(fmt, "RCPT TO: <{address}>"),
            Self::Data => fmt.write_str("DATA"),
            Self::CrlfDot => write!(fmt, "{CRLF}."),
            Self::Quit => fmt.write_str("QUIT"),
        }
    }
}

/// How a command line is shown in the log. The DATA terminator is not
/// printable as is and shows as `<CRLF>.`.
#[must_use]
pub fn display_token(command: &str) -> &str {
    if command.strip_prefix(CRLF) == Some(".") {
        "<CRLF>."
    } else {
        command
    }
}
