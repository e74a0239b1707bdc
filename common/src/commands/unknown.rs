use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// An SMTP command the MTA itself did not recognize.
///
/// Not to be confused with a frame whose milter code is unrecognized;
/// that is [`Unimplemented`](crate::misc::Unimplemented).
#[derive(Clone, PartialEq, Debug)]
pub struct Unknown {
    command: BytesMut,
}

impl Unknown {
    const CODE: u8 = b'U';

    /// Access the raw SMTP command line.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.command
    }
}

impl From<&[u8]> for Unknown {
    fn from(value: &[u8]) -> Self {
        Self {
            command: BytesMut::from(value),
        }
    }
}

impl Parsable for Unknown {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(command) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received unknown-command package without terminating null byte",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after unknown command", buffer).into(),
            );
        }

        Ok(Self { command })
    }
}

impl Writable for Unknown {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.command);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.command.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let parsed = Unknown::parse(BytesMut::from("VRFY user\0")).expect("Parse unsuccessful");

        assert_eq!(parsed.as_bytes(), b"VRFY user");

        let mut buffer = BytesMut::new();
        parsed.write(&mut buffer);
        assert_eq!(buffer, BytesMut::from("VRFY user\0"));
    }

    #[test]
    fn test_unterminated() {
        Unknown::parse(BytesMut::from("VRFY user")).expect_err("terminator is mandatory");
    }
}
