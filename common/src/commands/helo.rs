use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Helo information sent by the smtp client
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Helo {
    hostname: BytesMut,
}

impl From<&[u8]> for Helo {
    fn from(value: &[u8]) -> Self {
        Self {
            hostname: BytesMut::from_iter(value),
        }
    }
}

impl Helo {
    const CODE: u8 = b'H';

    /// The helo greeting sent by the client
    #[must_use]
    pub fn hostname(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.hostname)
    }
}

impl Parsable for Helo {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(hostname) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received helo package with missing null byte termination",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after helo hostname", buffer).into(),
            );
        }

        Ok(Self { hostname })
    }
}

impl Writable for Helo {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.hostname);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.hostname.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.hostname.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decoding::Parsable;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(BytesMut::from("helo\0"), Ok("helo"))]
    #[case(BytesMut::from("\0"), Ok(""))]
    #[case(
        BytesMut::new(),
        Err("Received helo package with missing null byte termination")
    )]
    #[case(
        BytesMut::from(" "),
        Err("Received helo package with missing null byte termination")
    )]
    #[case(BytesMut::from("a\0b\0"), Err("Trailing bytes after helo hostname"))]
    fn test_helo(#[case] input: BytesMut, #[case] expected: Result<&str, &str>) {
        let parsed = Helo::parse(input);

        match (parsed, expected) {
            (Ok(helo), Ok(hostname)) => assert_eq!(helo.hostname(), hostname),
            (Err(ProtocolError::InvalidData(e)), Err(msg)) => assert_eq!(e.msg, msg),
            (parsed, expected) => panic!("Expected {expected:?}, got {parsed:?}"),
        }
    }
}
