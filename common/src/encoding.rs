//! Implement what components may write to the wire

use bytes::BytesMut;
use enum_dispatch::enum_dispatch;

use crate::commands::{
    Abort, Body, Close, Connect, Data, EndOfHeaders, EndOfMessage, EnvelopeFrom,
    EnvelopeRecipient, Header, Helo, Macro, Unknown,
};
use crate::decoding::Message;
use crate::misc::{Misc, Unimplemented};
use crate::modifications::{
    AddHeader, AddRecipient, AddRecipientPar, ChangeHeader, ChangeSender, InsertHeader, Progress,
    Quarantine, RemoveRecipient, ReplaceBody,
};
use crate::optneg::Negotiate;
use crate::responses::{
    Accept, Continue, Discard, Reject, ReplyCode, Skip, TemporaryFailure,
};

/// Write something 'to the wire'.
///
/// Implementations write only their payload; the surrounding frame
/// (length prefix and code byte) is produced by
/// [`MilterCodec::encode`](crate::codec::MilterCodec::encode).
#[enum_dispatch(Message)]
pub trait Writable {
    /// Write self to the buffer
    fn write(&self, buffer: &mut BytesMut);

    /// Byte-length that would be written if [`Self::write`] is called
    fn len(&self) -> usize;

    /// The (unique) id code of this item
    fn code(&self) -> u8;

    /// Whether a call to [`Self::write`] would write something
    fn is_empty(&self) -> bool;
}
