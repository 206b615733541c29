//! Classification of SMTP reply lines.
//!
//! A reply is one or more lines. Every line but the last carries a hyphen (or
//! anything else) after the code; the last line is `<3 digits><space><text>`.
//! Intermediate lines are not validated, they are only read past.

/// Returns `true` if `line` is the final line of a reply.
#[must_use]
pub fn is_last_reply(line: &str) -> bool {
    let bytes = line.as_bytes();

    bytes.len() > 4
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && bytes[3] == b' '
        && bytes[4] != b'\n'
}

/// Returns `true` if `line` carries a 2xx or 3xx code.
#[must_use]
pub fn is_positive_reply(line: &str) -> bool {
    matches!(line.as_bytes().first(), Some(b'2' | b'3'))
}
