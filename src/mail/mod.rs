//! Byte-exact handling of raw EML files.
//!
//! A mail is `header ++ CRLFCRLF ++ body`. Only the header is ever rewritten,
//! and only its `Date:` and `Message-ID:` lines; everything else, including
//! folding and line endings, reaches the wire as it was on disk.

pub mod generate;
pub mod header;
pub mod scan;

use std::borrow::Cow;

use crate::error::MailFormatError;

pub use self::{
    header::replace_header,
    scan::{get_lines, CR, CRLF, LF},
};

/// The blank line separating header and body.
pub const EMPTY_LINE: [u8; 4] = [CR, LF, CR, LF];

/// Offset of the first `CRLFCRLF` in `bytes`.
#[must_use]
pub fn find_empty_line(bytes: &[u8]) -> Option<usize> {
    let mut offset = 0;

    while let Some(idx) = scan::find_cr(bytes, offset) {
        if bytes.get(idx + 1..idx + EMPTY_LINE.len()) == Some(&EMPTY_LINE[1..]) {
            return Some(idx);
        }

        offset = idx + 1;
    }

    None
}

/// Split a mail into header and body around the first blank line. The blank
/// line itself belongs to neither.
#[must_use]
pub fn split_mail(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    find_empty_line(bytes).map(|idx| (&bytes[..idx], &bytes[idx + EMPTY_LINE.len()..]))
}

/// Join a header and a body with a blank line. Inverse of [`split_mail`].
#[must_use]
pub fn combine_mail(header: &[u8], body: &[u8]) -> Vec<u8> {
    [header, &EMPTY_LINE, body].concat()
}

/// Refresh the `Date:` and/or `Message-ID:` header lines of a mail.
///
/// With both flags off the input is handed back as is, without copying.
///
/// # Errors
///
/// Returns [`MailFormatError`] if a rewrite is requested and the mail has no
/// header/body boundary.
pub fn replace_mail(
    bytes: &[u8],
    update_date: bool,
    update_message_id: bool,
) -> Result<Cow<'_, [u8]>, MailFormatError> {
    if !update_date && !update_message_id {
        return Ok(Cow::Borrowed(bytes));
    }

    let (header, body) = split_mail(bytes).ok_or(MailFormatError)?;
    let header = replace_header(header, update_date, update_message_id);

    Ok(Cow::Owned(combine_mail(&header, body)))
}
