//! Change the envelope sender

use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Replace the envelope sender (MAIL FROM) of the mail
///
/// An ESMTP argument string may follow the address; its absence is
/// distinguished on the wire by the payload ending after the address
/// terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSender {
    address: BytesMut,
    esmtp_args: Option<BytesMut>,
}

impl ChangeSender {
    const CODE: u8 = b'e';

    /// Set the new sender, optionally with ESMTP arguments
    #[must_use]
    pub fn new(address: &[u8], esmtp_args: Option<&[u8]>) -> Self {
        Self {
            address: BytesMut::from_iter(address),
            esmtp_args: esmtp_args.map(BytesMut::from_iter),
        }
    }

    /// The new envelope sender address
    #[must_use]
    pub fn address(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.address)
    }

    /// The ESMTP arguments to pass along, if any
    #[must_use]
    pub fn esmtp_args(&self) -> Option<Cow<str>> {
        self.esmtp_args.as_ref().map(|a| String::from_utf8_lossy(a))
    }
}

impl Parsable for ChangeSender {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(address) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Received change-sender package without null byte terminating the address",
                buffer,
            )
            .into());
        };

        let esmtp_args = if buffer.is_empty() {
            None
        } else {
            let Some(args) = buffer.delimited(0) else {
                return Err(InvalidData::new(
                    "Received change-sender package without null byte terminating the arguments",
                    buffer,
                )
                .into());
            };
            if !buffer.is_empty() {
                return Err(InvalidData::new(
                    "Trailing bytes after change-sender arguments",
                    buffer,
                )
                .into());
            }
            Some(args)
        };

        Ok(Self {
            address,
            esmtp_args,
        })
    }
}

impl Writable for ChangeSender {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.address);
        buffer.put_u8(0);
        if let Some(args) = &self.esmtp_args {
            buffer.extend_from_slice(args);
            buffer.put_u8(0);
        }
    }

    fn len(&self) -> usize {
        self.address.len()
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
        self.address.is_empty() && self.esmtp_args.is_none()
    }
}
