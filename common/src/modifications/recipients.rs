//! Add or remove envelope recipients

use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Add a recipient to the envelope
///
/// Does not change To in the headers
#[derive(Debug, Clone, PartialEq)]
pub struct AddRecipient {
    recipient: BytesMut,
}

impl AddRecipient {
    const CODE: u8 = b'+';

    /// Add the specified recipient
    #[must_use]
    pub fn new(recipient: &[u8]) -> Self {
        Self {
            recipient: BytesMut::from_iter(recipient),
        }
    }

    /// The recipient to add
    #[must_use]
    pub fn recipient(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.recipient)
    }
}

impl Parsable for AddRecipient {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(recipient) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received add-recipient package without null byte terminating it",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after added recipient", buffer).into(),
            );
        }

        Ok(Self { recipient })
    }
}

impl Writable for AddRecipient {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.recipient);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.recipient.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.recipient.is_empty()
    }
}

/// Add a recipient to the envelope, carrying ESMTP arguments
#[derive(Debug, Clone, PartialEq)]
pub struct AddRecipientPar {
    recipient: BytesMut,
    esmtp_args: Option<BytesMut>,
}

impl AddRecipientPar {
    const CODE: u8 = b'2';

    /// Add the specified recipient, optionally with ESMTP arguments
    #[must_use]
    pub fn new(recipient: &[u8], esmtp_args: Option<&[u8]>) -> Self {
        Self {
            recipient: BytesMut::from_iter(recipient),
            esmtp_args: esmtp_args.map(BytesMut::from_iter),
        }
    }

    /// The recipient to add
    #[must_use]
    pub fn recipient(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.recipient)
    }

    /// The ESMTP arguments to pass along, if any
    #[must_use]
    pub fn esmtp_args(&self) -> Option<Cow<str>> {
        self.esmtp_args.as_ref().map(|a| String::from_utf8_lossy(a))
    }
}

impl Parsable for AddRecipientPar {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(recipient) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received add-recipient package without null byte terminating the recipient",
                buffer,
            )
            .into());
        };

        let esmtp_args = if buffer.is_empty() {
            None
        } else {
            let Some(args) = buffer.delimited(0) else {
                return Err(InvalidData::new(
                    "Received add-recipient package without null byte terminating the arguments",
                    buffer,
                )
                .into());
            };
            if !buffer.is_empty() {
                return Err(InvalidData::new(
                    "Trailing bytes after add-recipient arguments",
                    buffer,
                )
                .into());
            }
            Some(args)
        };

        Ok(Self {
            recipient,
            esmtp_args,
        })
    }
}

impl Writable for AddRecipientPar {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.recipient);
        buffer.put_u8(0);
        if let Some(args) = &self.esmtp_args {
            buffer.extend_from_slice(args);
            buffer.put_u8(0);
        }
    }

    fn len(&self) -> usize {
        self.recipient.len()
            + 1
            + self
                .esmtp_args
                .as_ref()
                .map(|args| args.len() + 1)
                .unwrap_or_default()
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.recipient.is_empty() && self.esmtp_args.is_none()
    }
}

/// Remove a recipient from the envelope
///
/// Does not change To in the headers
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRecipient {
    recipient: BytesMut,
}

impl RemoveRecipient {
    const CODE: u8 = b'-';

    /// Remove the specified recipient
    #[must_use]
    pub fn new(recipient: &[u8]) -> Self {
        Self {
            recipient: BytesMut::from_iter(recipient),
        }
    }

    /// The (exact) recipient to be removed
    #[must_use]
    pub fn recipient(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.recipient)
    }
}

impl Parsable for RemoveRecipient {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(recipient) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received remove-recipient package without null byte terminating it",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(
                InvalidData::new("Trailing bytes after removed recipient", buffer).into(),
            );
        }

        Ok(Self { recipient })
    }
}

impl Writable for RemoveRecipient {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.recipient);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        self.recipient.len() + 1
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        self.recipient.is_empty()
    }
}
