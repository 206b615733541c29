//! Rewriting of the `Date:` and `Message-ID:` header fields.
//!
//! Fields are recognised by a literal, case-sensitive prefix on the physical
//! line. A replaced field is collapsed to a single physical line: its folded
//! continuation lines are dropped together with the original line.

use std::borrow::Cow;

use super::{
    generate::{make_now_date_line, make_random_message_id_line},
    scan::{get_lines, LF},
};

pub const DATE: &[u8] = b"Date:";
pub const MESSAGE_ID: &[u8] = b"Message-ID:";

/// Returns `true` if `line` starts with the field name `name`.
///
/// # Panics
///
/// Panics if `name` is empty.
#[must_use]
pub fn match_header(line: &[u8], name: &[u8]) -> bool {
    assert!(!name.is_empty(), "header field name must not be empty");

    line.starts_with(name)
}

/// A folded line continues the previous field and starts with a space or tab.
#[must_use]
pub fn is_folded_line(line: &[u8]) -> bool {
    matches!(line.first(), Some(b' ' | b'\t'))
}

/// Skip the continuation lines at the head of `lines`.
#[must_use]
pub fn drop_folded_line<L: AsRef<[u8]>>(lines: &[L]) -> &[L] {
    let folded = lines
        .iter()
        .take_while(|line| is_folded_line(line.as_ref()))
        .count();

    &lines[folded..]
}

/// Replace the first line accepted by `matches`, along with its continuation
/// lines, by the single line `make_line` produces.
///
/// Lines after the first match are left alone. If the replaced field was the
/// unterminated tail of the buffer, the new line loses its CRLF as well so
/// the line structure around it is kept.
pub fn replace_line<'a, M, F>(
    mut lines: Vec<Cow<'a, [u8]>>,
    matches: M,
    make_line: F,
) -> Vec<Cow<'a, [u8]>>
where
    M: Fn(&[u8]) -> bool,
    F: FnOnce() -> String,
{
    let Some(idx) = lines.iter().position(|line| matches(line.as_ref())) else {
        return lines;
    };

    let after = &lines[idx + 1..];
    let field_end = lines.len() - drop_folded_line(after).len();
    let terminated = lines[field_end - 1].last() == Some(&LF);

    let mut line = make_line().into_bytes();
    if !terminated {
        while matches!(line.last(), Some(b'\r' | b'\n')) {
            line.pop();
        }
    }

    let rest = lines.split_off(field_end);
    lines.truncate(idx);
    lines.push(Cow::Owned(line));
    lines.extend(rest);
    lines
}

fn replace_date_line(lines: Vec<Cow<'_, [u8]>>) -> Vec<Cow<'_, [u8]>> {
    replace_line(lines, |line| match_header(line, DATE), make_now_date_line)
}

fn replace_message_id_line(lines: Vec<Cow<'_, [u8]>>) -> Vec<Cow<'_, [u8]>> {
    replace_line(
        lines,
        |line| match_header(line, MESSAGE_ID),
        make_random_message_id_line,
    )
}

/// Refresh the `Date:` and/or `Message-ID:` lines of a header block.
///
/// Only the first occurrence of each field is replaced; every other byte of
/// the header is carried over unchanged.
#[must_use]
pub fn replace_header(header: &[u8], update_date: bool, update_message_id: bool) -> Vec<u8> {
    let mut lines: Vec<Cow<'_, [u8]>> = get_lines(header).into_iter().map(Cow::Borrowed).collect();

    if update_date {
        lines = replace_date_line(lines);
    }

    if update_message_id {
        lines = replace_message_id_line(lines);
    }

    lines.concat()
}
