//! Status-line token extraction.

use super::buffer::find_subslice;

/// Lowest and highest accepted status codes.
const STATUS_RANGE: std::ops::RangeInclusive<u16> = 100..=999;
const MAX_STATUS_DIGITS: usize = 3;

/// Parse the status code from a status line without its terminator.
///
/// The marker may be preceded by other bytes. One byte (the minor protocol
/// version) follows the marker, then any run of spaces, then the status
/// token, which ends at the next space or the end of the line.
///
/// Returns `None` when the marker is absent or the token is not a three-digit
/// decimal code.
pub(crate) fn parse_status_code(line: &[u8], marker: &[u8]) -> Option<u16> {
    let after_marker = find_subslice(line, marker)? + marker.len();
    let rest = line.get(after_marker + 1..)?;
    let skipped = rest.iter().take_while(|&&b| b == b' ').count();
    let rest = &rest[skipped..];
    let token_len = rest.iter().position(|&b| b == b' ').unwrap_or(rest.len());
    let token = &rest[..token_len];

    if token.is_empty()
        || token.len() > MAX_STATUS_DIGITS
        || !token.iter().all(u8::is_ascii_digit)
    {
        return None;
    }
    let code = token
        .iter()
        .fold(0_u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    STATUS_RANGE.contains(&code).then_some(code)
}
