use bytes::BytesMut;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::ProtocolError;

/// An email body chunk received from the MTA
///
/// The payload is the raw chunk with no terminator; its length is
/// implied by the frame.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Body {
    chunk: BytesMut,
}

impl From<Body> for Vec<u8> {
    fn from(value: Body) -> Self {
        value.chunk.to_vec()
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Self {
            chunk: BytesMut::from_iter(value),
        }
    }
}

impl Body {
    const CODE: u8 = b'B';

    /// Access the contained body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chunk
    }

    /// Convert this body chunk to a `Vec<u8>`
    #[must_use]
    pub fn to_vec(self) -> Vec<u8> {
        self.into()
    }
}

impl Parsable for Body {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        Ok(Self { chunk: buffer })
    }
}

impl Writable for Body {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.chunk);
    }

    fn len(&self) -> usize {
        self.chunk.len()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }
}

/// No more body chunks will be received after this
///
/// The payload may carry final body bytes; they are passed through
/// opaquely and not treated as another [`Body`] chunk.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EndOfMessage {
    chunk: BytesMut,
}

impl From<&[u8]> for EndOfMessage {
    fn from(value: &[u8]) -> Self {
        Self {
            chunk: BytesMut::from_iter(value),
        }
    }
}

impl EndOfMessage {
    const CODE: u8 = b'E';

    /// Access the trailing body bytes, if any.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chunk
    }
}

impl Parsable for EndOfMessage {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        Ok(Self { chunk: buffer })
    }
}

impl Writable for EndOfMessage {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.chunk);
    }

    fn len(&self) -> usize {
        self.chunk.len()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }
}
