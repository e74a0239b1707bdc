//! Contains anything related to option negotiation between MTA and filter

mod actions;
mod macros;
mod protocol;

use bytes::{Buf, BytesMut};
use thiserror::Error;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::error::STAGE_DECODING;
use crate::{NotEnoughData, ProtocolError};

pub use actions::ActionFlags;
pub use macros::{MacroStage, MacroStages};
pub use protocol::ProtocolFlags;

/// The option negotiation package opening every session
///
/// The MTA sends its protocol version and everything it offers; the
/// filter answers with the subset it wants. Unknown flag bits are
/// preserved on both paths so newer peers keep working.
#[derive(Clone, PartialEq, Debug)]
pub struct Negotiate {
    /// The milter protocol version this implementation speaks
    pub version: u32,
    /// Which modifications the filter may request
    pub actions: ActionFlags,
    /// Which events are sent and which responses are expected
    pub protocol: ProtocolFlags,
    /// Which macros the filter would like to receive per stage
    pub macros: MacroStages,
}

impl Default for Negotiate {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            actions: ActionFlags::default(),
            protocol: ProtocolFlags::default(),
            macros: MacroStages::default(),
        }
    }
}

/// Comparing two negotiation packages may produce this error.
/// See [`Negotiate::merge_compatible`] for details.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The peer speaks a version older than anything this
    /// implementation supports
    #[error("Received version {received} which is not compatible with {supported}")]
    UnsupportedVersion {
        /// The version received
        received: u32,
        /// The minimum version supported
        supported: u32,
    },
    /// The negotiation reply enables actions the peer never offered
    #[error("Reply enables actions {refused:?} the peer did not offer")]
    ActionsNotOffered {
        /// The action bits that were not offered
        refused: ActionFlags,
    },
}

impl Negotiate {
    /* VERSION: the milter protocol version Postfix speaks since 2.6;
    older installations fall back to version 2, which predates most of
    the flag bits handled here. */
    const VERSION: u32 = 6;
    const MIN_VERSION: u32 = 2;

    const DATA_SIZE: usize = 4 + 4 + 4;
    const CODE: u8 = b'O';

    /// Merge the `offer` of the peer into `self`, the desired options.
    ///
    /// The result carries the minimum of both versions and the
    /// intersection of both flag sets; unknown bits survive the
    /// intersection untouched.
    ///
    /// # Errors
    /// Fails when the offered version is older than anything this
    /// implementation can speak.
    pub fn merge_compatible(mut self, offer: &Self) -> Result<Self, NegotiationError> {
        if offer.version < Self::MIN_VERSION {
            return Err(NegotiationError::UnsupportedVersion {
                received: offer.version,
                supported: Self::MIN_VERSION,
            });
        }

        self.version = self.version.min(offer.version);

        self.protocol = self
            .protocol
            .merge_regarding_version(self.version, offer.protocol);

        self.actions = self
            .actions
            .merge_regarding_version(self.version, offer.actions);

        Ok(self)
    }
}

impl Parsable for Negotiate {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        if buffer.len() < Self::DATA_SIZE {
            return Err(NotEnoughData::new(
                STAGE_DECODING,
                "Option negotiation",
                "version and flag words truncated",
                Self::DATA_SIZE,
                buffer.len(),
                buffer,
            )
            .into());
        }

        // Length checked above, the three words are present.
        let version = buffer.get_u32();
        let actions = ActionFlags::from_bits_retain(buffer.get_u32());
        let protocol = ProtocolFlags::from_bits_retain(buffer.get_u32());

        let macros = MacroStages::parse(buffer)?;

        Ok(Self {
            version,
            actions,
            protocol,
            macros,
        })
    }
}

impl Writable for Negotiate {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.version.to_be_bytes());
        buffer.extend_from_slice(&self.actions.bits().to_be_bytes());
        buffer.extend_from_slice(&self.protocol.bits().to_be_bytes());

        self.macros.write(buffer);
    }

    fn len(&self) -> usize {
        Self::DATA_SIZE + self.macros.len()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        false
    }
}
