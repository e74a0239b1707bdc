use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::InvalidData;
use crate::ProtocolError;

/// An smtp header received
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Header {
    name: BytesMut,
    value: BytesMut,
}

impl Header {
    const CODE: u8 = b'L';

    /// Create a Header from some bytes
    #[must_use]
    pub fn new(name: &[u8], value: &[u8]) -> Self {
        Self {
            name: BytesMut::from_iter(name),
            value: BytesMut::from_iter(value),
        }
    }

    /// The name of the received header
    #[must_use]
    pub fn name(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.name)
    }

    /// The value of the received header
    #[must_use]
    pub fn value(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.value)
    }
}

impl Parsable for Header {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(name) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received header package without name terminated by null byte in it",
                buffer,
            )
            .into());
        };

        let Some(value) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received header package without value terminated by null byte in it",
                buffer,
            )
            .into());
        };

        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after header value", buffer).into(),
            );
        }

        Ok(Self { name, value })
    }
}

impl Writable for Header {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.name);
        buffer.put_u8(0);
        buffer.extend_from_slice(&self.value);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.name.len() + 1 + self.value.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// After all headers have been sent, end of headers is sent
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EndOfHeaders;

impl EndOfHeaders {
    const CODE: u8 = b'N';
}

impl Parsable for EndOfHeaders {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        if !buffer.is_empty() {
            return Err(InvalidData::new("EndOfHeaders carries no payload", buffer).into());
        }
        Ok(Self)
    }
}

impl Writable for EndOfHeaders {
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::decoding::Parsable;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(BytesMut::from("Subject\0hi\0"), Ok(("Subject", "hi")))]
    #[case(BytesMut::from("Subject\0\0"), Ok(("Subject", "")))]
    #[case(
        BytesMut::from("Subject\0hi"),
        Err("Received header package without value terminated by null byte in it")
    )]
    #[case(
        BytesMut::from("Subjecthi\0"),
        Err("Received header package without value terminated by null byte in it")
    )]
    #[case(
        BytesMut::from("Subject\0hi\0x"),
        Err("Trailing bytes after header value")
    )]
    fn test_header(#[case] input: BytesMut, #[case] expected: Result<(&str, &str), &str>) {
        let parsed = Header::parse(input);

        match (parsed, expected) {
            (Ok(header), Ok((name, value))) => {
                assert_eq!(header.name(), name);
                assert_eq!(header.value(), value);
            }
            (Err(ProtocolError::InvalidData(e)), Err(msg)) => assert_eq!(e.msg, msg),
            (parsed, expected) => panic!("Expected {expected:?}, got {parsed:?}"),
        }
    }

    #[test]
    fn test_write_header() {
        let header = Header::new(b"Subject", b"hi");

        let mut buffer = BytesMut::new();
        header.write(&mut buffer);

        assert_eq!(buffer, BytesMut::from("Subject\0hi\0"));
        assert_eq!(header.len(), buffer.len());
    }
}
