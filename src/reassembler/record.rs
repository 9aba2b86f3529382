//! The completed response record and the capped fields it is built from.

use bytes::Bytes;

use crate::error::FailureReason;

/// A reassembled response: status code plus capped header and body captures.
///
/// Ownership transfers to the caller of
/// [`take_result`](super::StreamResponseReassembler::take_result); the
/// reassembler keeps no reference to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseRecord {
    status_code: u16,
    headers: Bytes,
    headers_truncated: bool,
    body: Bytes,
    body_truncated: bool,
}

impl ResponseRecord {
    /// Status code parsed from the status line.
    #[must_use]
    pub const fn status_code(&self) -> u16 { self.status_code }

    /// Captured header block, terminator included unless truncated.
    #[must_use]
    pub fn headers(&self) -> &[u8] { &self.headers }

    /// True when the header block exceeded the field cap.
    #[must_use]
    pub const fn headers_truncated(&self) -> bool { self.headers_truncated }

    /// Captured body.
    #[must_use]
    pub fn body(&self) -> &[u8] { &self.body }

    /// True when the body exceeded the field cap.
    #[must_use]
    pub const fn body_truncated(&self) -> bool { self.body_truncated }

    /// Summary bits describing which fields were received or truncated.
    #[must_use]
    pub fn data_status(&self) -> DataStatus { DataStatus::for_record(self) }

    /// Consume the record, returning the owned header and body bytes.
    #[must_use]
    pub fn into_parts(self) -> (u16, Bytes, Bytes) { (self.status_code, self.headers, self.body) }
}

/// Per-field received/truncated bits as reported by HTTP proxy servers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DataStatus(u8);

impl DataStatus {
    /// Headers were captured in full.
    pub const HEADERS_RECEIVED: u8 = 0x01;
    /// Headers exceeded the field cap.
    pub const HEADERS_TRUNCATED: u8 = 0x02;
    /// Body was captured in full.
    pub const BODY_RECEIVED: u8 = 0x04;
    /// Body exceeded the field cap.
    pub const BODY_TRUNCATED: u8 = 0x08;

    fn for_record(record: &ResponseRecord) -> Self {
        let mut bits = 0;
        if record.headers_truncated {
            bits |= Self::HEADERS_TRUNCATED;
        } else if !record.headers.is_empty() {
            bits |= Self::HEADERS_RECEIVED;
        }
        if record.body_truncated {
            bits |= Self::BODY_TRUNCATED;
        } else if !record.body.is_empty() {
            bits |= Self::BODY_RECEIVED;
        }
        Self(bits)
    }

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }

    /// True when every bit in `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: u8) -> bool { self.0 & mask == mask }
}

/// A byte field that silently stops growing at its cap and remembers that it
/// did.
#[derive(Debug)]
pub(crate) struct CappedField {
    bytes: Vec<u8>,
    cap: usize,
    truncated: bool,
}

impl CappedField {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
            truncated: false,
        }
    }

    /// Append as much of `data` as fits under the cap.
    ///
    /// Returns `Ok(true)` when this call caused the field to become
    /// truncated.
    pub(crate) fn push(&mut self, data: &[u8]) -> Result<bool, FailureReason> {
        let take = data.len().min(self.cap - self.bytes.len());
        if take > 0 {
            self.bytes
                .try_reserve_exact(take)
                .map_err(|_| FailureReason::AllocationFailure)?;
            self.bytes.extend_from_slice(&data[..take]);
        }
        let newly_truncated = take < data.len() && !self.truncated;
        self.truncated |= take < data.len();
        Ok(newly_truncated)
    }

    pub(crate) fn len(&self) -> usize { self.bytes.len() }

    fn into_bytes(self) -> (Bytes, bool) { (Bytes::from(self.bytes), self.truncated) }
}

/// Record fields gathered while an exchange is in flight.
#[derive(Debug)]
pub(crate) struct PartialRecord {
    pub(crate) status_code: Option<u16>,
    pub(crate) headers: CappedField,
    pub(crate) body: CappedField,
}

impl PartialRecord {
    pub(crate) fn new(max_field: usize) -> Self {
        Self {
            status_code: None,
            headers: CappedField::new(max_field),
            body: CappedField::new(max_field),
        }
    }

    /// Freeze the captured fields into a [`ResponseRecord`].
    ///
    /// Returns `None` when no status code was recorded.
    pub(crate) fn finish(self) -> Option<ResponseRecord> {
        let status_code = self.status_code?;
        let (headers, headers_truncated) = self.headers.into_bytes();
        let (body, body_truncated) = self.body.into_bytes();
        Some(ResponseRecord {
            status_code,
            headers,
            headers_truncated,
            body,
            body_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn capped_field_stops_at_cap() {
        let mut field = CappedField::new(4);
        assert!(!field.push(b"ab").expect("push within cap"));
        assert!(field.push(b"cdef").expect("push over cap"));
        assert!(!field.push(b"gh").expect("push after truncation"));
        assert_eq!(field.len(), 4);
        let (bytes, truncated) = field.into_bytes();
        assert_eq!(bytes.as_ref(), b"abcd");
        assert!(truncated);
    }

    #[test]
    fn capped_field_at_exact_cap_is_not_truncated() {
        let mut field = CappedField::new(4);
        assert!(!field.push(b"abcd").expect("push to cap"));
        let (bytes, truncated) = field.into_bytes();
        assert_eq!(bytes.len(), 4);
        assert!(!truncated);
    }

    fn record(
        headers: &'static [u8],
        headers_truncated: bool,
        body: &'static [u8],
        body_truncated: bool,
    ) -> ResponseRecord {
        ResponseRecord {
            status_code: 200,
            headers: Bytes::from_static(headers),
            headers_truncated,
            body: Bytes::from_static(body),
            body_truncated,
        }
    }

    #[rstest]
    #[case(record(b"\r\n\r\n", false, b"ok", false), 0x05)]
    #[case(record(b"X: y", true, b"ok", false), 0x06)]
    #[case(record(b"\r\n\r\n", false, b"", false), 0x01)]
    #[case(record(b"\r\n\r\n", false, b"full", true), 0x09)]
    #[case(record(b"H", true, b"B", true), 0x0a)]
    fn data_status_reflects_fields(#[case] record: ResponseRecord, #[case] expected: u8) {
        assert_eq!(record.data_status().bits(), expected);
    }

    #[test]
    fn partial_record_without_status_does_not_finish() {
        assert!(PartialRecord::new(8).finish().is_none());
    }
}
