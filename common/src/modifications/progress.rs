use bytes::BytesMut;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Keep the connection alive while working on a slow modification.
///
/// Carries no payload and requires no negotiated action flag; the MTA
/// resets its reply timeout on receipt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Progress;

impl Progress {
    const CODE: u8 = b'p';
}

impl Parsable for Progress {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        if !buffer.is_empty() {
            return Err(InvalidData::new("Progress carries no payload", buffer).into());
        }
        Ok(Self)
    }
}

impl Writable for Progress {
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
