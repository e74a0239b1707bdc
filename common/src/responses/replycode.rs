use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::error::STAGE_DECODING;
use crate::{InvalidData, NotEnoughData, ProtocolError};

/// Return this SMTP status line to the smtp client
///
/// The wire shape is three ASCII digits, a space, and a null-terminated
/// text. Only 4xx and 5xx codes are representable; anything else would
/// not be a rejection and has no meaning in a filter verdict.
#[derive(Clone, PartialEq, Debug)]
pub struct ReplyCode {
    code: u16,
    message: BytesMut,
}

impl ReplyCode {
    const CODE: u8 = b'y';

    /// Create a reply with the given status code and message text.
    ///
    /// # Errors
    /// Fails with [`InvalidData`] if `code` is outside the 4xx/5xx
    /// range.
    pub fn new(code: u16, message: &[u8]) -> Result<Self, InvalidData> {
        if !(400..=599).contains(&code) {
            return Err(InvalidData::new(
                "Reply code outside the 4xx/5xx range",
                BytesMut::from_iter(code.to_string().as_bytes()),
            ));
        }

        Ok(Self {
            code,
            message: BytesMut::from_iter(message),
        })
    }

    /// The three digit smtp status code
    #[must_use]
    pub fn status(&self) -> u16 {
        self.code
    }

    /// The text following the status code
    #[must_use]
    pub fn message(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.message)
    }
}

impl Parsable for ReplyCode {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(digits) = buffer.safe_split_to(3) else {
            return Err(NotEnoughData::new(
                STAGE_DECODING,
                "ReplyCode",
                "Status code missing",
                3,
                buffer.len(),
                buffer,
            )
            .into());
        };

        if !matches!(digits[0], b'4' | b'5')
            || !digits[1].is_ascii_digit()
            || !digits[2].is_ascii_digit()
        {
            return Err(InvalidData::new("Reply code is not a 4xx or 5xx status", digits).into());
        }
        let code = (u16::from(digits[0] - b'0') * 100)
            + (u16::from(digits[1] - b'0') * 10)
            + u16::from(digits[2] - b'0');

        match buffer.safe_get_u8() {
            Some(b' ') => {}
            _ => {
                return Err(InvalidData::new(
                    "Missing space separator after reply code",
                    buffer,
                )
                .into())
            }
        }

        let Some(message) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Missing null byte terminating the reply text",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(InvalidData::new("Trailing bytes after reply text", buffer).into());
        }

        Ok(Self { code, message })
    }
}

impl Writable for ReplyCode {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(self.code.to_string().as_bytes());
        buffer.put_u8(b' ');
        buffer.extend_from_slice(&self.message);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        3 + 1 + self.message.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(BytesMut::from("451 slow\0"), 451, "slow")]
    #[case(BytesMut::from("554 go away\0"), 554, "go away")]
    #[case(BytesMut::from("550 \0"), 550, "")]
    fn test_parse_ok(#[case] input: BytesMut, #[case] code: u16, #[case] message: &str) {
        let reply = ReplyCode::parse(input.clone()).expect("Parse unsuccessful");

        assert_eq!(reply.status(), code);
        assert_eq!(reply.message(), message);

        let mut buffer = BytesMut::new();
        reply.write(&mut buffer);
        assert_eq!(buffer, input);
        assert_eq!(reply.len(), buffer.len());
    }

    #[rstest]
    #[case(BytesMut::from("abc Hello\0"))]
    #[case(BytesMut::from("251 all good\0"))]
    #[case(BytesMut::from("45"))]
    #[case(BytesMut::from("451-slow\0"))]
    #[case(BytesMut::from("451 slow"))]
    fn test_parse_malformed(#[case] input: BytesMut) {
        ReplyCode::parse(input).expect_err("malformed status lines must not parse");
    }

    #[test]
    fn test_new_range_check() {
        assert_matches!(ReplyCode::new(251, b"all good"), Err(_));

        let reply = ReplyCode::new(451, b"try later").expect("4xx is in range");
        assert_eq!(reply.status(), 451);
    }
}
