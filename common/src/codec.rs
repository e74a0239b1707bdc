//! Length-prefixed framing between raw bytes and [`Message`] values.
//!
//! Every frame on the wire is a big-endian `u32` size, one code byte
//! and `size - 1` payload bytes; the size field counts the code byte
//! but not itself. [`MilterCodec`] buffers arbitrary byte chunks and
//! pops one complete message at a time.

use bytes::{Buf, BufMut, BytesMut};

use crate::decoding::Message;
use crate::encoding::Writable;
use crate::{InvalidData, ProtocolError};

/// Default upper bound for a single frame: 1 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 2_usize.pow(20);

/// The `MilterCodec` is responsible for decoding bytes on the wire
/// into [`Message`] values and encoding them back.
///
/// Reading is pull-based: [`feed`](Self::feed) raw chunks in as they
/// arrive, then call [`read_one`](Self::read_one) until it signals that
/// more bytes are needed. A frame declaring a size beyond the
/// configured maximum fails before its payload is ever buffered, so a
/// hostile peer cannot make this allocate without bound.
#[derive(Debug, Clone)]
pub struct MilterCodec {
    max_frame_size: usize,
    buffer: BytesMut,
}

impl Default for MilterCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl MilterCodec {
    /// Create a codec enforcing the given maximum frame size.
    #[must_use]
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            buffer: BytesMut::new(),
        }
    }

    /// Append received bytes to the internal buffer.
    ///
    /// Never blocks and never fails; validation happens on read.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pop a single complete message off the buffer.
    ///
    /// Returns `Ok(None)` when the buffered bytes do not yet hold a
    /// complete frame; feed more and retry. Buffered data is only
    /// consumed once a whole frame is present, so partial frames
    /// survive across calls untouched.
    ///
    /// # Errors
    /// Fails with a [`ProtocolError`] on a malformed frame. The byte
    /// stream is unrecoverable after that; tear the session down.
    pub fn read_one(&mut self) -> Result<Option<Message>, ProtocolError> {
        if self.buffer.len() < 4 {
            // Not enough data to read the length marker.
            return Ok(None);
        }

        // Read the length marker.
        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&self.buffer[..4]);
        let length = u32::from_be_bytes(length_bytes) as usize;

        // The size field counts the code byte, so zero cannot frame
        // any message.
        if length == 0 {
            return Err(InvalidData::new(
                "Frame size field must at least count the code byte",
                self.buffer.split_to(4),
            )
            .into());
        }

        // Check that the length is not too large to avoid a denial of
        // service attack where this end runs out of memory.
        if length > self.max_frame_size {
            return Err(ProtocolError::TooMuchData(length));
        }

        // If arrived data is smaller than 4 bytes of length marker +
        // the decoded length, we need more data.
        if self.buffer.len() < 4 + length {
            self.buffer.reserve(4 + length - self.buffer.len());
            return Ok(None);
        }

        // Use advance to modify the buffer such that it no longer
        // contains this frame.
        let mut frame = self.buffer.split_to(4 + length);
        frame.advance(4);

        Message::parse(frame).map(Some)
    }

    /// Iterate over all complete messages currently buffered.
    ///
    /// The iterator ends at the first incomplete frame; it fuses after
    /// yielding an error.
    pub fn read_many(&mut self) -> Messages<'_> {
        Messages {
            codec: self,
            failed: false,
        }
    }

    /// Write the framed form of `message` to `dst`.
    ///
    /// # Errors
    /// Fails with [`ProtocolError::TooMuchData`] if the message payload
    /// exceeds the configured maximum frame size.
    pub fn encode(&self, message: &Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        // Don't send a frame longer than the other end will accept or
        // larger than the length field can express.
        let payload_len = message.len();
        if payload_len > self.max_frame_size || payload_len > u32::MAX as usize - 1 {
            return Err(ProtocolError::TooMuchData(payload_len));
        }

        // The cast cannot overflow due to the length check above.
        let frame_len = payload_len + 1;
        let frame_len_be = u32::to_be_bytes(frame_len as u32);

        dst.reserve(4 + frame_len);

        dst.extend_from_slice(&frame_len_be);
        dst.put_u8(message.code());
        message.write(dst);
        Ok(())
    }
}

/// Iterator returned by [`MilterCodec::read_many`]
#[derive(Debug)]
pub struct Messages<'c> {
    codec: &'c mut MilterCodec,
    failed: bool,
}

impl Iterator for Messages<'_> {
    type Item = Result<Message, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.codec.read_one() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
