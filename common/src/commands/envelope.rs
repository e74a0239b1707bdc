//! The envelope phase of a transaction: sender, recipients, DATA.

use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// The envelope sender of a mail to be processed
///
/// Optional ESMTP arguments follow the address as further
/// null-terminated strings; they are kept raw and split on access so
/// re-encoding reproduces the received bytes exactly.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EnvelopeFrom {
    sender: BytesMut,
    esmtp_args: Option<BytesMut>,
}

impl From<&[u8]> for EnvelopeFrom {
    fn from(value: &[u8]) -> Self {
        Self {
            sender: BytesMut::from_iter(value),
            esmtp_args: None,
        }
    }
}

impl EnvelopeFrom {
    const CODE: u8 = b'K';

    /// The sender of this email
    #[must_use]
    pub fn sender(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.sender)
    }

    /// Optionally set additional esmtp args.
    ///
    /// If those are absent, an empty vector is returned.
    #[must_use]
    pub fn esmtp_args(&self) -> Vec<Cow<str>> {
        split_args(self.esmtp_args.as_ref())
    }
}

impl Parsable for EnvelopeFrom {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(sender) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Null-byte missing in envelope package to delimit the sender",
                buffer,
            )
            .into());
        };

        Ok(Self {
            sender,
            esmtp_args: remaining_args(buffer),
        })
    }
}

impl Writable for EnvelopeFrom {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.sender);
        buffer.put_u8(0);
        if let Some(b) = &self.esmtp_args {
            buffer.extend_from_slice(b);
        }
    }

    fn len(&self) -> usize {
        self.sender.len()
            + 1
            + self
                .esmtp_args
                .as_ref()
                .map(BytesMut::len)
                .unwrap_or_default()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.sender.is_empty() && self.esmtp_args.is_none()
    }
}

/// An envelope recipient of a mail to be processed
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EnvelopeRecipient {
    recipient: BytesMut,
    esmtp_args: Option<BytesMut>,
}

impl From<&[u8]> for EnvelopeRecipient {
    fn from(value: &[u8]) -> Self {
        Self {
            recipient: BytesMut::from_iter(value),
            esmtp_args: None,
        }
    }
}

impl EnvelopeRecipient {
    const CODE: u8 = b'R';

    /// The recipient as received by the MTA
    #[must_use]
    pub fn recipient(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.recipient)
    }

    /// Optional esmtp arguments regarding this recipient.
    ///
    /// Returns an empty `Vec` if no esmtp args were received
    #[must_use]
    pub fn esmtp_args(&self) -> Vec<Cow<str>> {
        split_args(self.esmtp_args.as_ref())
    }
}

impl Parsable for EnvelopeRecipient {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(recipient) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Null-byte missing in envelope package to delimit the recipient",
                buffer,
            )
            .into());
        };

        Ok(Self {
            recipient,
            esmtp_args: remaining_args(buffer),
        })
    }
}

impl Writable for EnvelopeRecipient {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.recipient);
        buffer.put_u8(0);
        if let Some(b) = &self.esmtp_args {
            buffer.extend_from_slice(b);
        }
    }

    fn len(&self) -> usize {
        self.recipient.len()
            + 1
            + self
                .esmtp_args
                .as_ref()
                .map(BytesMut::len)
                .unwrap_or_default()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.recipient.is_empty() && self.esmtp_args.is_none()
    }
}

/// SMTP Data command has been sent
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Data;

impl Data {
    const CODE: u8 = b'T';
}

impl Parsable for Data {
    const CODE: u8 = Self::CODE;

    fn parse(buffer: BytesMut) -> Result<Self, ProtocolError> {
        if !buffer.is_empty() {
            return Err(InvalidData::new("Data carries no payload", buffer).into());
        }
        Ok(Self)
    }
}

impl Writable for Data {
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

fn remaining_args(buffer: BytesMut) -> Option<BytesMut> {
    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

fn split_args(args: Option<&BytesMut>) -> Vec<Cow<str>> {
    let Some(args) = args else {
        return Vec::new();
    };

    args[..]
        .split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .map(String::from_utf8_lossy)
        .collect()
}
