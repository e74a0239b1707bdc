use bytes::BytesMut;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

macro_rules! empty_verdict {
    ($(#[$doc:meta])* $name:ident, $code:literal) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Debug, Default)]
        pub struct $name;

        impl $name {
            const CODE: u8 = $code;
        }

        impl Parsable for $name {
            const CODE: u8 = Self::CODE;

            fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
                if !buffer.is_empty() {
                    return Err(InvalidData::new(
                        concat!(stringify!($name), " carries no payload"),
                        buffer,
                    )
                    .into());
                }
                Ok(Self)
            }
        }

        impl Writable for $name {
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
    };
}

empty_verdict!(
    /// Continue with the next step in the milter protocol
    Continue,
    b'c'
);

empty_verdict!(
    /// Reject this mail, informing the smtp client about it
    Reject,
    b'r'
);

empty_verdict!(
    /// (Silently) discard this mail without forwarding it
    Discard,
    b'd'
);

empty_verdict!(
    /// Accept this mail unconditionally; no further events follow for it
    Accept,
    b'a'
);

empty_verdict!(
    /// Return a temporary failure code to the smtp client
    TemporaryFailure,
    b't'
);

empty_verdict!(
    /// Stop sending more of the current event kind.
    ///
    /// Only valid in answer to a body chunk, and only when the SKIP
    /// protocol option was negotiated.
    Skip,
    b's'
);

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_empty() {
        Continue::parse(BytesMut::new()).expect("empty payload parses");
        Accept::parse(BytesMut::new()).expect("empty payload parses");
        Skip::parse(BytesMut::new()).expect("empty payload parses");
    }

    #[test]
    fn test_reject_payload() {
        let res = Reject::parse(BytesMut::from("x"));

        assert_matches!(res, Err(ProtocolError::InvalidData(_)));
    }
}
