use std::borrow::Cow;

use bytes::{BufMut, BytesMut};
use miltwire_utils::ByteParsing;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::decoding::Parsable;
use crate::encoding::Writable;
use crate::{error::STAGE_DECODING, InvalidData, NotEnoughData};
use crate::ProtocolError;

/// A marker for the connection family
#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Debug, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Family {
    Unknown = b'U',
    Unix = b'L',
    Inet = b'4',
    Inet6 = b'6',
}

impl Family {
    fn parse(byte: u8) -> Result<Self, ProtocolError> {
        match Family::try_from(byte) {
            Ok(f) => Ok(f),
            Err(_) => Err(InvalidData {
                msg: "Received unknown protocol family for connection info",
                offending_bytes: BytesMut::from_iter(&[byte]),
            }
            .into()),
        }
    }
}

/// Connect information about the smtp client
///
/// For [`Family::Unknown`] connections the payload carries no port or
/// address; for every other family a port (0 for unix sockets) and a
/// printable address follow.
#[derive(Clone, PartialEq, Debug)]
pub struct Connect {
    hostname: BytesMut,
    /// The kind of connection the smtp client used
    pub family: Family,
    /// On an IP connection, the port of the connection
    pub port: Option<u16>,
    address: BytesMut,
}

impl Connect {
    const CODE: u8 = b'C';

    /// Create a new connect package
    #[must_use]
    pub fn new(hostname: &[u8], family: Family, port: Option<u16>, address: &[u8]) -> Self {
        Self {
            hostname: BytesMut::from_iter(hostname),
            family,
            port,
            address: BytesMut::from_iter(address),
        }
    }

    /// Get the received hostname as a string-like type.
    #[must_use]
    pub fn hostname(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.hostname)
    }

    /// Get the received address as a string-like type.
    ///
    /// Remember, this can contain an IP-Address or a unix socket path.
    #[must_use]
    pub fn address(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.address)
    }
}

impl Parsable for Connect {
    const CODE: u8 = Self::CODE;

    fn parse(mut buffer: BytesMut) -> Result<Self, ProtocolError> {
        let Some(hostname) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Null-byte missing in connection package to delimit hostname",
                buffer,
            )
            .into());
        };

        let Some(family) = buffer.safe_get_u8() else {
            return Err(NotEnoughData::new(
                STAGE_DECODING,
                "Connect",
                "Family missing",
                1,
                0,
                buffer,
            )
            .into());
        };
        let family = Family::parse(family)?;

        if family == Family::Unknown {
            if !buffer.is_empty() {
                return Err(InvalidData::new(
                    "Trailing bytes after unknown-family connection info",
                    buffer,
                )
                .into());
            }
            return Ok(Connect {
                hostname,
                family,
                port: None,
                address: BytesMut::new(),
            });
        }

        let Some(port) = buffer.safe_get_u16() else {
            return Err(NotEnoughData::new(
                STAGE_DECODING,
                "Connect",
                "Port missing",
                2,
                buffer.len(),
                buffer,
            )
            .into());
        };

        let Some(address) = buffer.delimited(0) else {
            return Err(InvalidData::new(
                "Null-byte missing in connection package to delimit address",
                buffer,
            )
            .into());
        };
        if !buffer.is_empty() {
            return Err(InvalidData::new(
                "Trailing bytes after connection address",
                buffer,
            )
            .into());
        }

        Ok(Connect {
            hostname,
            family,
            port: Some(port),
            address,
        })
    }
}

impl Writable for Connect {
    fn write(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.hostname);
        buffer.put_u8(0);

        buffer.put_u8(self.family.into());

        if self.family == Family::Unknown {
            return;
        }

        buffer.put_u16(self.port.unwrap_or_default());

        buffer.extend_from_slice(&self.address);
        buffer.put_u8(0);
    }

    fn len(&self) -> usize {
        let head = self.hostname.len() + 1 + 1;
        if self.family == Family::Unknown {
            head
        } else {
            head + 2 + self.address.len() + 1
        }
    }

    fn code(&self) -> u8 {
        Self::CODE
    }

    fn is_empty(&self) -> bool {
        false
    }
}
