//! Carefully put this mail in a box and leave it

use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Quarantine the message into a holding pool defined by the MTA.
#[derive(Debug, Clone, PartialEq)]
pub struct Quarantine {
    reason: BytesMut,
}

impl Quarantine {
    const CODE: u8 = b'q';

    /// Quarantine with the given reason
    #[must_use]
    pub fn new(reason: &[u8]) -> Self {
        Self {
            reason: BytesMut::from_iter(reason),
        }
    }

    /// The reason given why this mail was quarantined
    #[must_use]
    pub fn reason(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.reason)
    }
}

impl Parsable for Quarantine {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(reason) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received quarantine package without null byte terminating the reason",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after quarantine reason", buffer).into(),
            );
        }

        Ok(Self { reason })
    }
}

impl Writable for Quarantine {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.reason);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.reason.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.reason.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let quarantine = Quarantine::new(b"suspicious attachment");

        let mut buffer = BytesMut::new();
        quarantine.write(&mut buffer);
        assert_eq!(buffer, BytesMut::from("suspicious attachment\0"));

        let parsed = Quarantine::parse(buffer).expect("Parse unsuccessful");
        assert_eq!(parsed, quarantine);
    }
}
