use std::{
    borrow::BorrowMut,
    ops::{Index, IndexMut},
};

use bytes::{BufMut, BytesMut};
use itertools::Itertools;
use miltwire_utils::ByteParsing;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::STAGE_DECODING;
use crate::{InvalidData, NotEnoughData, ProtocolError};

/// Macro symbols requested per stage during option negotiation.
///
/// The wire form is a sequence of records, each a 4-byte stage id
/// followed by a null-terminated, space-separated symbol list:
///
/// `\x00\x00\x00\x00j {client_ptr}\x00\x00\x00\x00\x01{cipher}\x00`
///
/// Stages with no symbols requested do not appear on the wire.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MacroStages {
    stages: [Vec<String>; STAGE_COUNT],
}

impl IndexMut<MacroStage> for MacroStages {
    fn index_mut(&mut self, index: MacroStage) -> &mut Self::Output {
        self.stages[index.as_usize()].borrow_mut()
    }
}

impl Index<MacroStage> for MacroStages {
    type Output = Vec<String>;

    fn index(&self, index: MacroStage) -> &Self::Output {
        &self.stages[index.as_usize()]
    }
}

impl MacroStages {
    pub(crate) fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let mut stages = Self::default();

        while !buffer.is_empty() {
            let Some(id) = buffer.safe_get_u32() else {
                return Err(NotEnoughData::new(
                    STAGE_DECODING,
                    "MacroStages",
                    "stage id truncated",
                    4,
                    buffer.len(),
                    buffer,
                )
                .into());
            };
            let Ok(stage) = MacroStage::try_from(id) else {
                return Err(InvalidData::new(
                    "Macro stage id out of range",
                    BytesMut::from_iter(id.to_be_bytes()),
                )
                .into());
            };

            let Some(symbols) = buffer.delimited(0) else {
                return Err(InvalidData::new(
                    "Missing null byte terminating a macro symbol list",
                    buffer,
                )
                .into());
            };

            let stage = &mut stages[stage];
            stage.extend(
                String::from_utf8_lossy(&symbols)
                    .split_ascii_whitespace()
                    .map(str::to_string),
            );
        }

        Ok(stages)
    }

    pub(crate) fn write(&self, buffer: &mut BytesMut) {
        for (stage, symbols) in MacroStage::ALL.into_iter().zip(&self.stages) {
            // For empty requests, don't send anything.
            // Postfix would ignore the request either way.
            if symbols.is_empty() {
                continue;
            }

            buffer.put_u32(stage.into());

            buffer.extend_from_slice(symbols.iter().join(" ").as_bytes());
            buffer.put_u8(0);
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        let mut accumulator = 0;
        for stage in &self.stages {
            if stage.is_empty() {
                continue;
            }

            accumulator += MacroStage::CODE_SIZE;
            for symbol in stage {
                // One byte per symbol covers the space separators and,
                // for the last symbol, the null terminator.
                accumulator += symbol.len() + 1;
            }
        }

        accumulator
    }

    /// Whether any stage has symbols requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(Vec::is_empty)
    }

    /// Request `macros` for the `stage` provided.
    pub fn with_stage<S: ToString>(&mut self, stage: MacroStage, macros: &[S]) {
        let stage = &mut self[stage];
        for m in macros {
            stage.push(m.to_string());
        }
    }
}

const STAGE_COUNT: usize = 7;

/// A macro stage index into [`MacroStages`]
#[derive(Debug, Copy, Clone, IntoPrimitive, TryFromPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum MacroStage {
    /// `SMFIM_CONNECT`
    Connect = 0,
    /// `SMFIM_HELO`
    Helo = 1,
    /// `SMFIM_ENVFROM`
    EnvelopeFrom = 2,
    /// `SMFIM_ENVRCPT`
    EnvelopeRecipient = 3,
    /// `SMFIM_DATA`
    Data = 4,
    /// `SMFIM_EOM`
    EndOfMessage = 5,
    /// `SMFIM_EOH`
    EndOfHeaders = 6,
}

impl MacroStage {
    const CODE_SIZE: usize = 4;

    /// All stages, in wire id order.
    pub const ALL: [MacroStage; STAGE_COUNT] = [
        MacroStage::Connect,
        MacroStage::Helo,
        MacroStage::EnvelopeFrom,
        MacroStage::EnvelopeRecipient,
        MacroStage::Data,
        MacroStage::EndOfMessage,
        MacroStage::EndOfHeaders,
    ];

    fn as_usize(self) -> usize {
        let self_u32: u32 = self.into();
        self_u32 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_stages() {
        let mut stages = MacroStages::default();
        stages.with_stage(MacroStage::Connect, &["j", "{client_ptr}"]);
        stages.with_stage(MacroStage::EnvelopeRecipient, &["{rcpt_addr}"]);

        let mut buffer = BytesMut::new();
        stages.write(&mut buffer);

        let expected =
            BytesMut::from("\0\0\0\0j {client_ptr}\0\0\0\0\x03{rcpt_addr}\0".as_bytes());
        assert_eq!(buffer, expected);
        assert_eq!(stages.len(), buffer.len());
    }

    #[test]
    fn test_parse_stages() {
        let buffer = BytesMut::from("\0\0\0\0spam eggs\0\0\0\0\x01ham\0".as_bytes());

        let stages = MacroStages::parse(buffer).expect("Parse unsuccessful");

        assert_eq!(stages[MacroStage::Connect], vec!["spam", "eggs"]);
        assert_eq!(stages[MacroStage::Helo], vec!["ham"]);
        assert_eq!(stages[MacroStage::Data], Vec::<String>::new());
    }

    #[test]
    fn test_parse_stage_out_of_range() {
        let buffer = BytesMut::from("\0\0\0\x0aspam\0".as_bytes());

        MacroStages::parse(buffer).expect_err("stage 10 is not defined");
    }

    #[test]
    fn test_roundtrip() {
        let mut stages = MacroStages::default();
        stages.with_stage(MacroStage::EndOfMessage, &["i", "{auth_authen}"]);

        let mut buffer = BytesMut::new();
        stages.write(&mut buffer);

        let parsed = MacroStages::parse(buffer).expect("Parse unsuccessful");
        assert_eq!(parsed, stages);
    }
}
