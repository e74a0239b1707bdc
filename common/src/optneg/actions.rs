bitflags::bitflags! {
    /// What modifications the filter may request after end-of-message.
    ///
    /// Sendmail docs call these "actions".
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct ActionFlags: u32 {
        /// Add headers (SMFIF_ADDHDRS)
        const ADD_HEADERS = 0x0000_0001;
        /// Replace body chunks (SMFIF_CHGBODY)
        const CHANGE_BODY = 0x0000_0002;
        /// Add recipients (SMFIF_ADDRCPT)
        const ADD_RCPT = 0x0000_0004;
        /// Remove recipients (SMFIF_DELRCPT)
        const DEL_RCPT = 0x0000_0008;
        /// Change or delete headers (SMFIF_CHGHDRS)
        const CHANGE_HEADERS = 0x0000_0010;
        /// Quarantine message (SMFIF_QUARANTINE)
        const QUARANTINE = 0x0000_0020;
        /// Change the envelope sender (SMFIF_CHGFROM)
        const CHANGE_FROM = 0x0000_0040;
        /// Add recipients including ESMTP arguments (SMFIF_ADDRCPT_PAR)
        const ADD_RCPT_PAR = 0x0000_0080;
        /// Send macro symbol lists back (SMFIF_SETSYMLIST)
        const SETSYMLIST = 0x0000_0100;
    }
}

impl Default for ActionFlags {
    /// Enables all actions per default
    fn default() -> Self {
        ActionFlags::all()
    }
}

impl ActionFlags {
    /// Merge `other` action flags with `self`
    ///
    /// Currently no version dependent merging implemented
    #[must_use]
    pub fn merge_regarding_version(self, _version: u32, other: Self) -> Self {
        self.intersection(other)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_create_valid() {
        let input: u32 = 0x0000_0001;

        let bitflags = ActionFlags::from_bits(input);

        assert!(bitflags.is_some());
    }

    #[test]
    fn test_retain_unknown_bits() {
        let input: u32 = 0x8000_0123;

        let bitflags = ActionFlags::from_bits_retain(input);

        assert_eq!(bitflags.bits(), input);
    }

    #[test]
    fn test_intersection() {
        let offered = ActionFlags::ADD_HEADERS | ActionFlags::QUARANTINE;
        let desired = ActionFlags::ADD_HEADERS | ActionFlags::CHANGE_BODY;

        let effective = desired.merge_regarding_version(6, offered);

        assert_eq!(effective, ActionFlags::ADD_HEADERS);
    }
}
