//! Implement what components may be parsed from the wire

use bytes::{Buf, BytesMut};
use enum_dispatch::enum_dispatch;

use crate::commands::{
    Abort, Body, Close, Connect, Data, EndOfHeaders, EndOfMessage, EnvelopeFrom,
    EnvelopeRecipient, Header, Helo, Macro, Unknown,
};
use crate::misc::{Misc, Unimplemented};
use crate::modifications::{
    AddHeader, AddRecipient, AddRecipientPar, ChangeHeader, ChangeSender, InsertHeader, Progress,
    Quarantine, RemoveRecipient, ReplaceBody,
};
use crate::optneg::Negotiate;
use crate::responses::{
    Accept, Continue, Discard, Reject, ReplyCode, Skip, TemporaryFailure,
};
use crate::{error::STAGE_DECODING, NotEnoughData, ProtocolError};

/// Parse something 'from the wire'.
pub(crate) trait Parsable: Sized {
    /// The unique id code for this item
    const CODE: u8;

    /// Parse a `Self` from the given `BytesMut` buffer.
    ///
    /// # Errors
    /// This can fail to parse, returning a [`ProtocolError`].
    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError>;
}

/// Every message defined by the milter wire protocol.
///
/// The one-byte code stored in each frame selects the variant; see the
/// contained types for their payload schemas.
#[allow(missing_docs)]
#[enum_dispatch]
#[cfg_attr(feature = "tracing", derive(strum::Display))]
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Setup
    Negotiate,
    Macro,
    // SMTP session events reported by the MTA
    Connect,
    Helo,
    EnvelopeFrom,
    EnvelopeRecipient,
    Data,
    Unknown,
    Header,
    EndOfHeaders,
    Body,
    EndOfMessage,
    Abort,
    Close,
    // Verdicts returned by the filter
    Continue,
    Reject,
    Discard,
    Accept,
    TemporaryFailure,
    Skip,
    ReplyCode,
    // Modification requests returned by the filter
    AddHeader,
    ChangeHeader,
    InsertHeader,
    ChangeSender,
    AddRecipient,
    AddRecipientPar,
    RemoveRecipient,
    ReplaceBody,
    Progress,
    Quarantine,
    // Reserved and unrecognized traffic
    Misc,
    Unimplemented,
}

/// Coarse classification of a [`Message`].
///
/// The session state machine keys its direction and phase checks on
/// this rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFamily {
    /// Option negotiation and macro bookkeeping
    Setup,
    /// SMTP session events, sent MTA to filter
    Event,
    /// Per-event verdicts, sent filter to MTA
    Response,
    /// Post-message modification requests, sent filter to MTA
    Modification,
    /// Reserved codes and unrecognized frames
    Misc,
}

impl Message {
    /// Parse a frame body (code byte plus payload) into structured data.
    ///
    /// Frames with a reserved code become [`Message::Misc`]; frames with
    /// a code this implementation does not know become
    /// [`Message::Unimplemented`], keeping their raw payload so the
    /// caller may log them and continue reading the stream.
    ///
    /// # Errors
    /// Fails with a [`ProtocolError`] if the payload does not match the
    /// schema of the message selected by the code byte.
    pub fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        if buffer.is_empty() {
            return Err(NotEnoughData::new(
                STAGE_DECODING,
                "Message",
                "code missing to detect which message it is",
                1,
                0,
                buffer,
            )
            .into());
        }
        let code = buffer.get_u8();
        let message = match code {
            Negotiate::CODE => Negotiate::parse(buffer)?.into(),
            Macro::CODE => Macro::parse(buffer)?.into(),

            Connect::CODE => Connect::parse(buffer)?.into(),
            Helo::CODE => Helo::parse(buffer)?.into(),
            EnvelopeFrom::CODE => EnvelopeFrom::parse(buffer)?.into(),
            EnvelopeRecipient::CODE => EnvelopeRecipient::parse(buffer)?.into(),
            Data::CODE => Data::parse(buffer)?.into(),
            Unknown::CODE => Unknown::parse(buffer)?.into(),
            Header::CODE => Header::parse(buffer)?.into(),
            EndOfHeaders::CODE => EndOfHeaders::parse(buffer)?.into(),
            Body::CODE => Body::parse(buffer)?.into(),
            EndOfMessage::CODE => EndOfMessage::parse(buffer)?.into(),
            Abort::CODE => Abort::parse(buffer)?.into(),
            Close::CODE => Close::parse(buffer)?.into(),

            Continue::CODE => Continue::parse(buffer)?.into(),
            Reject::CODE => Reject::parse(buffer)?.into(),
            Discard::CODE => Discard::parse(buffer)?.into(),
            Accept::CODE => Accept::parse(buffer)?.into(),
            TemporaryFailure::CODE => TemporaryFailure::parse(buffer)?.into(),
            Skip::CODE => Skip::parse(buffer)?.into(),
            ReplyCode::CODE => ReplyCode::parse(buffer)?.into(),

            AddHeader::CODE => AddHeader::parse(buffer)?.into(),
            ChangeHeader::CODE => ChangeHeader::parse(buffer)?.into(),
            InsertHeader::CODE => InsertHeader::parse(buffer)?.into(),
            ChangeSender::CODE => ChangeSender::parse(buffer)?.into(),
            AddRecipient::CODE => AddRecipient::parse(buffer)?.into(),
            AddRecipientPar::CODE => AddRecipientPar::parse(buffer)?.into(),
            RemoveRecipient::CODE => RemoveRecipient::parse(buffer)?.into(),
            ReplaceBody::CODE => ReplaceBody::parse(buffer)?.into(),
            Progress::CODE => Progress::parse(buffer)?.into(),
            Quarantine::CODE => Quarantine::parse(buffer)?.into(),

            Misc::SHUTDOWN | Misc::CONNECTION_FAIL | Misc::SET_SYMBOL_LIST => {
                Misc::new(code, buffer).into()
            }
            _ => Unimplemented::new(code, buffer).into(),
        };

        Ok(message)
    }

    /// Which family this message belongs to
    #[must_use]
    pub fn family(&self) -> MessageFamily {
        match self {
            Message::Negotiate(_) | Message::Macro(_) => MessageFamily::Setup,

            Message::Connect(_)
            | Message::Helo(_)
            | Message::EnvelopeFrom(_)
            | Message::EnvelopeRecipient(_)
            | Message::Data(_)
            | Message::Unknown(_)
            | Message::Header(_)
            | Message::EndOfHeaders(_)
            | Message::Body(_)
            | Message::EndOfMessage(_)
            | Message::Abort(_)
            | Message::Close(_) => MessageFamily::Event,

            Message::Continue(_)
            | Message::Reject(_)
            | Message::Discard(_)
            | Message::Accept(_)
            | Message::TemporaryFailure(_)
            | Message::Skip(_)
            | Message::ReplyCode(_) => MessageFamily::Response,

            Message::AddHeader(_)
            | Message::ChangeHeader(_)
            | Message::InsertHeader(_)
            | Message::ChangeSender(_)
            | Message::AddRecipient(_)
            | Message::AddRecipientPar(_)
            | Message::RemoveRecipient(_)
            | Message::ReplaceBody(_)
            | Message::Progress(_)
            | Message::Quarantine(_) => MessageFamily::Modification,

            Message::Misc(_) | Message::Unimplemented(_) => MessageFamily::Misc,
        }
    }
}
