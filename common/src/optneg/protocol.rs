use crate::decoding::Message;

bitflags::bitflags! {
    /// Protocol flags configuring communications behavior
    ///
    /// The `NO_*` bits opt out of receiving an event entirely; the
    /// `NR_*` bits keep the event but waive its response.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct ProtocolFlags: u32 {
        /// MTA should not send connect info
        #[doc(alias = "SMFIP_NOCONNECT")]
        const NO_CONNECT = 0x0000_0001;
        /// MTA should not send HELO info
        #[doc(alias = "SMFIP_NOHELO")]
        const NO_HELO = 0x0000_0002;
        /// MTA should not send the envelope sender
        #[doc(alias = "SMFIP_NOMAIL")]
        const NO_MAIL = 0x0000_0004;
        /// MTA should not send envelope recipients
        #[doc(alias = "SMFIP_NORCPT")]
        const NO_RECIPIENT = 0x0000_0008;
        /// MTA should not send body chunks
        #[doc(alias = "SMFIP_NOBODY")]
        const NO_BODY = 0x0000_0010;
        /// MTA should not send headers
        #[doc(alias = "SMFIP_NOHDRS")]
        const NO_HEADERS = 0x0000_0020;
        /// MTA should not send end-of-headers
        #[doc(alias = "SMFIP_NOEOH")]
        const NO_END_OF_HEADERS = 0x0000_0040;
        /// No reply for headers
        #[doc(alias = "SMFIP_NR_HDR")]
        const NR_HEADER = 0x0000_0080;
        /// MTA should not send unknown commands
        #[doc(alias = "SMFIP_NOUNKNOWN")]
        const NO_UNKNOWN = 0x0000_0100;
        /// MTA should not send DATA
        #[doc(alias = "SMFIP_NODATA")]
        const NO_DATA = 0x0000_0200;
        /// MTA understands the skip verdict
        #[doc(alias = "SMFIP_SKIP")]
        const SKIP = 0x0000_0400;
        /// MTA should also send rejected recipients
        #[doc(alias = "SMFIP_RCPT_REJ")]
        const REJECTED_RCPT = 0x0000_0800;
        /// No reply for connect
        #[doc(alias = "SMFIP_NR_CONN")]
        const NR_CONNECT = 0x0000_1000;
        /// No reply for HELO
        #[doc(alias = "SMFIP_NR_HELO")]
        const NR_HELO = 0x0000_2000;
        /// No reply for the envelope sender
        #[doc(alias = "SMFIP_NR_MAIL")]
        const NR_MAIL = 0x0000_4000;
        /// No reply for envelope recipients
        #[doc(alias = "SMFIP_NR_RCPT")]
        const NR_RECIPIENT = 0x0000_8000;
        /// No reply for DATA
        #[doc(alias = "SMFIP_NR_DATA")]
        const NR_DATA = 0x0001_0000;
        /// No reply for unknown commands
        #[doc(alias = "SMFIP_NR_UNKN")]
        const NR_UNKNOWN = 0x0002_0000;
        /// No reply for end-of-headers
        #[doc(alias = "SMFIP_NR_EOH")]
        const NR_END_OF_HEADERS = 0x0004_0000;
        /// No reply for body chunks
        #[doc(alias = "SMFIP_NR_BODY")]
        const NR_BODY = 0x0008_0000;
        /// Header values keep their leading space
        #[doc(alias = "SMFIP_HDR_LEADSPC")]
        const HEADER_LEADING_SPACE = 0x0010_0000;
    }
}

impl Default for ProtocolFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl ProtocolFlags {
    /// Whether `self` indicates that this event should not be sent at all
    #[must_use]
    pub fn should_skip_send(&self, message: &Message) -> bool {
        match message {
            Message::Connect(_) => self.contains(ProtocolFlags::NO_CONNECT),
            Message::Helo(_) => self.contains(ProtocolFlags::NO_HELO),
            Message::EnvelopeFrom(_) => self.contains(ProtocolFlags::NO_MAIL),
            Message::EnvelopeRecipient(_) => self.contains(ProtocolFlags::NO_RECIPIENT),
            Message::Header(_) => self.contains(ProtocolFlags::NO_HEADERS),
            Message::EndOfHeaders(_) => self.contains(ProtocolFlags::NO_END_OF_HEADERS),
            Message::Data(_) => self.contains(ProtocolFlags::NO_DATA),
            Message::Body(_) => self.contains(ProtocolFlags::NO_BODY),
            Message::Unknown(_) => self.contains(ProtocolFlags::NO_UNKNOWN),
            _ => false,
        }
    }

    /// Whether `self` indicates no response should be sent to this event
    #[must_use]
    pub fn should_skip_response(&self, message: &Message) -> bool {
        match message {
            Message::Connect(_) => self.contains(ProtocolFlags::NR_CONNECT),
            Message::Helo(_) => self.contains(ProtocolFlags::NR_HELO),
            Message::EnvelopeFrom(_) => self.contains(ProtocolFlags::NR_MAIL),
            Message::EnvelopeRecipient(_) => self.contains(ProtocolFlags::NR_RECIPIENT),
            Message::Header(_) => self.contains(ProtocolFlags::NR_HEADER),
            Message::EndOfHeaders(_) => self.contains(ProtocolFlags::NR_END_OF_HEADERS),
            Message::Data(_) => self.contains(ProtocolFlags::NR_DATA),
            Message::Body(_) => self.contains(ProtocolFlags::NR_BODY),
            Message::Unknown(_) => self.contains(ProtocolFlags::NR_UNKNOWN),
            _ => false,
        }
    }

    /// Merge `other` protocol flags with `self`
    ///
    /// Currently no version dependent merging implemented
    #[must_use]
    pub fn merge_regarding_version(self, _version: u32, other: Self) -> Self {
        self.intersection(other)
    }
}
