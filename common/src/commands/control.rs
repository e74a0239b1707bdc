use bytes::BytesMut;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Abort the current transaction.
///
/// The connection stays open; the MTA may start the next mail with a
/// fresh envelope afterwards.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Abort;

impl Abort {
    const CODE: u8 = b'A';
}

impl Parsable for Abort {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        if !buffer.is_empty() {
            return Err(InvalidData::new("Abort carries no payload", buffer).into());
        }
        Ok(Self)
    }
}

impl Writable for Abort {
    fn write(&self, _buffer: &mut BytesMut) {}

    fn len(&self) -> usize {
        0
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// Close this connection gracefully
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Close;

impl Close {
    const CODE: u8 = b'Q';
}

impl Parsable for Close {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        if !buffer.is_empty() {
            return Err(InvalidData::new("Close carries no payload", buffer).into());
        }
        Ok(Self)
    }
}

impl Writable for Close {
    fn write(&self, _buffer: &mut BytesMut) {}

    fn len(&self) -> usize {
        0
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        true
    }
}
