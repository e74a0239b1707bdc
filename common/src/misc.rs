//! Reserved and unrecognized wire traffic.

use bytes::BytesMut;

use crate::encoding::Writable;

/// A frame with a reserved code.
///
/// Shutdown (`4`), connection-fail (`f`) and set-symbol-list (`l`)
/// have codes assigned but no payload schema anyone documents. The
/// codec hands them through with their raw payload; the session rejects
/// them unless explicitly told to tolerate them.
#[derive(Debug, Clone, PartialEq)]
pub struct Misc {
    tag: u8,
    payload: BytesMut,
}

impl Misc {
    /// 421: shutdown (internal to the MTA)
    pub const SHUTDOWN: u8 = b'4';
    /// Cause a connection failure
    pub const CONNECTION_FAIL: u8 = b'f';
    /// Set list of macro symbols
    pub const SET_SYMBOL_LIST: u8 = b'l';

    pub(crate) fn new(tag: u8, payload: BytesMut) -> Self {
        Self { tag, payload }
    }

    /// The reserved code byte of this frame
    #[must_use]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// The raw payload as received
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl Writable for Misc {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.payload);
    }

    fn len(&self) -> usize {
        self.payload.len()
    }

    fn code(&self) -> u8 {
        self.tag
    }

    fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A frame whose code this implementation does not know.
///
/// Unknown codes are not a framing error: the frame boundary is intact,
/// so the raw bytes are preserved here and the stream keeps being
/// readable. What to do with the frame is the caller's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Unimplemented {
    tag: u8,
    payload: BytesMut,
}

impl Unimplemented {
    pub(crate) fn new(tag: u8, payload: BytesMut) -> Self {
        Self { tag, payload }
    }

    /// The unrecognized code byte
    #[must_use]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// The raw payload as received
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl Writable for Unimplemented {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.payload);
    }

    fn len(&self) -> usize {
        self.payload.len()
    }

    fn code(&self) -> u8 {
        self.tag
    }

    fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
