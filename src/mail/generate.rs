use chrono::{DateTime, FixedOffset, Local};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use super::scan::CRLF;

/// Number of random characters in a generated Message-ID.
pub const MESSAGE_ID_LENGTH: usize = 62;

/// Furthest offsets, in minutes east of UTC, a `Date:` line may carry.
const MIN_OFFSET: i32 = -12 * 60;
const MAX_OFFSET: i32 = 14 * 60;

/// A `Date:` line for the current local time.
#[must_use]
pub fn make_now_date_line() -> String {
    make_date_line(&DateTime::<FixedOffset>::from(Local::now()))
}

/// A `Date:` line such as `Date: Sun, 26 Jul 2020 22:01:37 +0900`, CRLF
/// terminated.
///
/// # Panics
///
/// Panics if the offset is more than 12 hours behind or 14 hours ahead of UTC.
#[must_use]
pub fn make_date_line(time: &DateTime<FixedOffset>) -> String {
    let offset = time.offset().local_minus_utc() / 60;
    assert!(
        (MIN_OFFSET..=MAX_OFFSET).contains(&offset),
        "UTC offset out of range: {offset} minutes"
    );

    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.unsigned_abs();

    format!(
        "Date: {} {sign}{:02}{:02}{CRLF}",
        time.format("%a, %d %b %Y %H:%M:%S"),
        offset / 60,
        offset % 60,
    )
}

/// A `Message-ID:` line with a fresh random alphanumeric id, CRLF terminated.
#[must_use]
pub fn make_random_message_id_line() -> String {
    let id: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MESSAGE_ID_LENGTH)
        .map(char::from)
        .collect();

    format!("Message-ID: <{id}>{CRLF}")
}
