//! Byte-level scanning over raw mail buffers.

pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';
pub const CRLF: &str = "\r\n";

/// Offset of the first CR at or after `offset`.
#[must_use]
pub fn find_cr(bytes: &[u8], offset: usize) -> Option<usize> {
    find(bytes, CR, offset)
}

/// Offset of the first LF at or after `offset`.
#[must_use]
pub fn find_lf(bytes: &[u8], offset: usize) -> Option<usize> {
    find(bytes, LF, offset)
}

fn find(bytes: &[u8], needle: u8, offset: usize) -> Option<usize> {
    bytes
        .get(offset..)?
        .iter()
        .position(|&b| b == needle)
        .map(|idx| idx + offset)
}

/// Offsets of every LF in `bytes`, ascending.
#[must_use]
pub fn find_all_lf(bytes: &[u8]) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut offset = 0;

    while let Some(idx) = find_lf(bytes, offset) {
        indices.push(idx);
        offset = idx + 1;
    }

    indices
}

/// Split `bytes` into physical lines, each keeping its terminator.
///
/// Lines end just after every LF, and a final boundary at the end of the
/// buffer captures an unterminated last line. A buffer that ends in LF (or is
/// empty) therefore yields a trailing empty line. Concatenating the result
/// always gives back `bytes`.
#[must_use]
pub fn get_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut start = 0;

    find_all_lf(bytes)
        .into_iter()
        .map(|idx| idx + 1)
        .chain(std::iter::once(bytes.len()))
        .map(|end| {
            let line = &bytes[start..end];
            start = end;
            line
        })
        .collect()
}
