use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::error::STAGE_DECODING;
use crate::{NotEnoughData, ProtocolError};

/// Macros received for the event identified by `Macro.stage`.
///
/// Macros carry symbol values (client address, queue id, auth identity
/// and the like) and always precede the event they belong to. The table
/// is an even sequence of null-terminated strings forming (name, value)
/// pairs; a name without a value is a framing error.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Macro {
    /// The code of the event this macro belongs to.
    pub stage: u8,
    macros: Vec<(BytesMut, BytesMut)>,
}

impl Macro {
    const CODE: u8 = b'D';

    /// Create a macro package for the event code `stage`.
    #[must_use]
    pub fn new(stage: u8, macros: &[(&[u8], &[u8])]) -> Self {
        Self {
            stage,
            macros: macros
                .iter()
                .map(|(name, value)| (BytesMut::from_iter(*name), BytesMut::from_iter(*value)))
                .collect(),
        }
    }

    /// An iterator over received macros in (name, value) format.
    pub fn macros(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.macros.iter().map(|(b, c)| (&b[..], &c[..]))
    }
}

impl Parsable for Macro {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(stage) = buffer.safe_get_u8() else {
            return Err(
                NotEnoughData::new(STAGE_DECODING, "Macro", "Stage missing", 1, 0, buffer).into(),
            );
        };

        let field_count = bytecount::count(&buffer, 0);
        let mut macros = Vec::with_capacity(field_count / 2);
        while !buffer.is_empty() {
            let Some(name) = buffer.delimited(0) else {
                return Err(NotEnoughData::new(
                    STAGE_DECODING,
                    "Macro",
                    "missing null byte delimiter after name",
                    1,
                    0,
                    buffer,
                )
                .into());
            };

            let Some(value) = buffer.delimited(0) else {
                return Err(NotEnoughData::new(
                    STAGE_DECODING,
                    "Macro",
                    "missing null byte delimiter after value",
                    1,
                    0,
                    buffer,
                )
                .into());
            };

            macros.push((name, value));
        }

        Ok(Self { stage, macros })
    }
}

impl Writable for Macro {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.put_u8(self.stage);
        for (name, value) in &self.macros {
            buffer.extend_from_slice(name);
            buffer.put_u8(0);
            buffer.extend_from_slice(value);
            buffer.put_u8(0);
        }
    }

    fn len(&self) -> usize {
        1 + self
            .macros
            .iter()
            .map(|(name, value)| name.len() + 1 + value.len() + 1)
            .sum::<usize>()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("O\0\0", b'O', "", "")]
    #[case("Ckey\x00value\x00", b'C', "key", "value")]
    fn test_parse_ok(
        #[case] input: &str,
        #[case] stage: u8,
        #[case] name: &str,
        #[case] value: &str,
    ) {
        let input = BytesMut::from(input);
        let res = Macro::parse(input).expect("Parse unsuccessful");

        assert_eq!(res.stage, stage);
        assert_eq!(
            res.macros,
            vec![(BytesMut::from(name), BytesMut::from(value))]
        );
    }

    #[test]
    fn test_parse_odd_table() {
        let input = BytesMut::from("Cname\x00value\x00odd\x00");

        Macro::parse(input).expect_err("odd macro tables must not parse");
    }

    #[test]
    fn test_roundtrip() {
        let input = BytesMut::from("C{client_addr}\x00192.0.2.1\x00j\x00mx1\x00");
        let parsed = Macro::parse(input.clone()).expect("Parse unsuccessful");

        let mut buffer = BytesMut::new();
        parsed.write(&mut buffer);

        assert_eq!(buffer, input);
        assert_eq!(parsed.len(), buffer.len());
    }
}
