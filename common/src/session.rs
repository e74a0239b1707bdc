//! Per-connection sequencing of milter traffic.
//!
//! The codec only checks that single frames are well formed; this
//! module checks that whole conversations are. A [`Session`] follows
//! one connection from option negotiation to close, remembers the
//! negotiated flags, and refuses any message that is out of order, in
//! the wrong direction, or not covered by what was negotiated.
//!
//! The session never performs I/O. The caller decodes a frame, offers
//! it to [`Session::feed_inbound`], and only hands it on when that
//! succeeds; likewise everything to be transmitted passes
//! [`Session::feed_outbound`] first.

use thiserror::Error;

use crate::decoding::{Message, MessageFamily};
use crate::encoding::Writable;
use crate::optneg::{ActionFlags, Negotiate, NegotiationError, ProtocolFlags};

/// The phase a milter conversation is in.
///
/// Phases are ordered as they occur in a session; everything from
/// [`Phase::Greeted`] onward repeats per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// No negotiation packages exchanged yet
    PreNegotiate,
    /// Options are fixed, no connection information seen
    Negotiated,
    /// Connection information received
    Connected,
    /// HELO received, between transactions
    Greeted,
    /// Envelope sender seen, collecting recipients
    Envelope,
    /// DATA announced
    Data,
    /// Receiving headers
    Headers,
    /// Receiving body chunks
    Body,
    /// End-of-message seen; modification window is open
    AwaitingEom,
    /// Connection closed, terminal
    Closed,
}

/// Sequencing errors returned by [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The message is well formed but illegal in the current phase,
    /// direction, or under the negotiated flags.
    #[error("Unexpected message with code '{code}' in phase {phase:?}")]
    Unexpected {
        /// The code byte of the offending message
        code: char,
        /// The phase the session was in
        phase: Phase,
    },
    /// The negotiation reply did not fit the offer
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    /// Outbound traffic before negotiation completed
    #[error("Messages may not be sent before option negotiation completed")]
    NotNegotiated,
}

/// Tracks one milter connection between an MTA and a filter.
///
/// Created empty, fed one decoded [`Message`] at a time, discarded
/// when the connection ends. Events and setup arrive via
/// [`feed_inbound`](Self::feed_inbound); verdicts and modifications
/// leave via [`feed_outbound`](Self::feed_outbound). A successful feed
/// advances the phase; a failed feed leaves the session untouched.
#[derive(Debug)]
pub struct Session {
    version: u32,
    actions: ActionFlags,
    protocol: ProtocolFlags,
    phase: Phase,
    recipients: u32,
    offer: Option<Negotiate>,
    response_pending: bool,
    body_skipped: bool,
    accept_unimplemented: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session awaiting negotiation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 0,
            actions: ActionFlags::empty(),
            protocol: ProtocolFlags::empty(),
            phase: Phase::PreNegotiate,
            recipients: 0,
            offer: None,
            response_pending: false,
            body_skipped: false,
            accept_unimplemented: false,
        }
    }

    /// Tolerate reserved and unrecognized messages instead of treating
    /// them as unexpected.
    pub fn set_accept_unimplemented(&mut self, accept: bool) {
        self.accept_unimplemented = accept;
    }

    /// The current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The negotiated protocol version; 0 before negotiation
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The action flags in effect for this session
    #[must_use]
    pub fn actions(&self) -> ActionFlags {
        self.actions
    }

    /// The protocol flags in effect for this session
    #[must_use]
    pub fn protocol(&self) -> ProtocolFlags {
        self.protocol
    }

    /// Recipients seen in the current transaction
    #[must_use]
    pub fn recipients(&self) -> u32 {
        self.recipients
    }

    /// Validate and apply a message received from the MTA.
    ///
    /// # Errors
    /// [`SessionError::Unexpected`] leaves the session state untouched;
    /// whether to abort the transaction or tear down the connection is
    /// the caller's policy.
    pub fn feed_inbound(&mut self, message: &Message) -> Result<(), SessionError> {
        if self.phase == Phase::Closed {
            return Err(self.unexpected(message));
        }

        match message {
            Message::Negotiate(offer) => {
                if self.phase != Phase::PreNegotiate || self.offer.is_some() {
                    return Err(self.unexpected(message));
                }
                self.offer = Some(offer.clone());
                self.response_pending = true;
                Ok(())
            }
            // Macros precede the event they belong to and expect no
            // response themselves.
            Message::Macro(_) => {
                if self.phase == Phase::PreNegotiate {
                    return Err(self.unexpected(message));
                }
                Ok(())
            }
            Message::Misc(_) | Message::Unimplemented(_) => {
                if self.accept_unimplemented {
                    Ok(())
                } else {
                    Err(self.unexpected(message))
                }
            }
            _ if message.family() == MessageFamily::Event => self.feed_event(message),
            _ => Err(self.unexpected(message)),
        }
    }

    /// Validate and apply a message the filter wants to send.
    ///
    /// # Errors
    /// [`SessionError::NotNegotiated`] before negotiation completed,
    /// [`SessionError::Negotiation`] for a reply that does not fit the
    /// offer, [`SessionError::Unexpected`] otherwise. Failed feeds
    /// leave the session state untouched.
    pub fn feed_outbound(&mut self, message: &Message) -> Result<(), SessionError> {
        if self.phase == Phase::Closed {
            return Err(self.unexpected(message));
        }

        if let Message::Negotiate(reply) = message {
            if self.offer.is_none() {
                return Err(SessionError::NotNegotiated);
            }
            if self.phase != Phase::PreNegotiate {
                return Err(self.unexpected(message));
            }
            return self.complete_negotiation(reply);
        }

        if self.phase == Phase::PreNegotiate {
            return Err(SessionError::NotNegotiated);
        }

        match message.family() {
            MessageFamily::Response => self.feed_response(message),
            MessageFamily::Modification => self.feed_modification(message),
            _ => Err(self.unexpected(message)),
        }
    }

    fn unexpected(&self, message: &Message) -> SessionError {
        SessionError::Unexpected {
            code: message.code() as char,
            phase: self.phase,
        }
    }

    fn complete_negotiation(&mut self, reply: &Negotiate) -> Result<(), SessionError> {
        let offer = self.offer.as_ref().ok_or(SessionError::NotNegotiated)?;

        if reply.version > offer.version {
            return Err(NegotiationError::UnsupportedVersion {
                received: reply.version,
                supported: offer.version,
            }
            .into());
        }
        let refused = reply.actions.difference(offer.actions);
        if !refused.is_empty() {
            return Err(NegotiationError::ActionsNotOffered { refused }.into());
        }

        self.version = reply.version;
        self.actions = reply.actions;
        self.protocol = reply.protocol;
        self.phase = Phase::Negotiated;
        self.response_pending = false;
        Ok(())
    }

    fn feed_event(&mut self, message: &Message) -> Result<(), SessionError> {
        use Phase::{
            AwaitingEom, Body, Connected, Data, Envelope, Greeted, Headers, Negotiated,
        };

        // An event the filter opted out of must never arrive.
        if self.protocol.should_skip_send(message) {
            return Err(self.unexpected(message));
        }

        let next = match message {
            Message::Close(_) => Phase::Closed,
            // Aborts may interrupt a waiting response; anything else
            // has to wait until the pending event was answered.
            Message::Abort(_) if self.phase >= Connected => {
                if self.phase == Connected {
                    Connected
                } else {
                    Greeted
                }
            }
            _ if self.response_pending => return Err(self.unexpected(message)),
            Message::Connect(_) if self.phase == Negotiated => Connected,
            Message::Helo(_) if matches!(self.phase, Connected | Greeted) => Greeted,
            Message::EnvelopeFrom(_) if matches!(self.phase, Connected | Greeted) => Envelope,
            Message::EnvelopeRecipient(_) if self.phase == Envelope => Envelope,
            Message::Data(_) if self.phase == Envelope => Data,
            Message::Header(_) if matches!(self.phase, Envelope | Data | Headers) => Headers,
            Message::EndOfHeaders(_) if matches!(self.phase, Envelope | Data | Headers) => Body,
            Message::Body(_) if self.phase == Body && !self.body_skipped => Body,
            Message::EndOfMessage(_) if self.phase == Body => AwaitingEom,
            Message::Unknown(_) if self.phase >= Negotiated && self.phase <= Body => self.phase,
            _ => return Err(self.unexpected(message)),
        };

        match message {
            Message::EnvelopeFrom(_) => self.recipients = 0,
            Message::EnvelopeRecipient(_) => self.recipients += 1,
            Message::EndOfMessage(_) => self.body_skipped = false,
            Message::Abort(_) => {
                self.recipients = 0;
                self.body_skipped = false;
            }
            _ => {}
        }

        self.response_pending = match message {
            Message::Abort(_) | Message::Close(_) => false,
            // End-of-message always awaits at least a final verdict.
            Message::EndOfMessage(_) => true,
            _ => !self.protocol.should_skip_response(message),
        };

        self.phase = next;
        Ok(())
    }

    fn feed_response(&mut self, message: &Message) -> Result<(), SessionError> {
        if self.phase == Phase::AwaitingEom {
            // The final verdict closes the modification window and the
            // transaction with it. Skip has no meaning here.
            if matches!(message, Message::Skip(_)) {
                return Err(self.unexpected(message));
            }
            self.phase = Phase::Greeted;
            self.recipients = 0;
            self.response_pending = false;
            return Ok(());
        }

        if !self.response_pending {
            return Err(self.unexpected(message));
        }

        if matches!(message, Message::Skip(_)) {
            if self.phase != Phase::Body || !self.protocol.contains(ProtocolFlags::SKIP) {
                return Err(self.unexpected(message));
            }
            self.body_skipped = true;
        }

        self.response_pending = false;
        Ok(())
    }

    fn feed_modification(&mut self, message: &Message) -> Result<(), SessionError> {
        if self.phase != Phase::AwaitingEom {
            return Err(self.unexpected(message));
        }

        if let Some(required) = required_action(message) {
            if !self.actions.contains(required) {
                return Err(self.unexpected(message));
            }
        }

        Ok(())
    }
}

/// The action flag a modification needs to have negotiated.
///
/// [`Progress`](crate::modifications::Progress) is plain keep-alive and
/// needs none.
fn required_action(message: &Message) -> Option<ActionFlags> {
    match message {
        Message::AddHeader(_) => Some(ActionFlags::ADD_HEADERS),
        Message::ChangeHeader(_) | Message::InsertHeader(_) => {
            Some(ActionFlags::CHANGE_HEADERS)
        }
        Message::ChangeSender(_) => Some(ActionFlags::CHANGE_FROM),
        Message::AddRecipient(_) => Some(ActionFlags::ADD_RCPT),
        Message::AddRecipientPar(_) => Some(ActionFlags::ADD_RCPT_PAR),
        Message::RemoveRecipient(_) => Some(ActionFlags::DEL_RCPT),
        Message::ReplaceBody(_) => Some(ActionFlags::CHANGE_BODY),
        Message::Quarantine(_) => Some(ActionFlags::QUARANTINE),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::{
        Abort, Body, Close, Connect, Data, EndOfHeaders, EndOfMessage, EnvelopeFrom,
        EnvelopeRecipient, Family, Header, Helo, Macro,
    };
    use crate::modifications::{AddHeader, Quarantine};
    use crate::responses::{Continue, Skip};

    fn negotiated(protocol: ProtocolFlags, actions: ActionFlags) -> Session {
        let mut session = Session::new();

        let offer = Negotiate {
            version: 6,
            actions: ActionFlags::all(),
            protocol: ProtocolFlags::all(),
            ..Negotiate::default()
        };
        session
            .feed_inbound(&offer.clone().into())
            .expect("offer accepted");

        let reply = Negotiate {
            version: 6,
            actions,
            protocol,
            ..Negotiate::default()
        };
        session
            .feed_outbound(&reply.into())
            .expect("reply accepted");

        session
    }

    fn connect() -> Message {
        Connect::new(b"mail.example.com", Family::Inet, Some(25), b"192.0.2.1").into()
    }

    fn advance_to_body(session: &mut Session) {
        session.feed_inbound(&connect()).expect("connect");
        session.feed_outbound(&Continue.into()).expect("respond");
        session
            .feed_inbound(&EnvelopeFrom::from(b"a@b".as_slice()).into())
            .expect("mail from");
        session.feed_outbound(&Continue.into()).expect("respond");
        session
            .feed_inbound(&EnvelopeRecipient::from(b"c@d".as_slice()).into())
            .expect("rcpt to");
        session.feed_outbound(&Continue.into()).expect("respond");
        session.feed_inbound(&Data.into()).expect("data");
        session.feed_outbound(&Continue.into()).expect("respond");
        session
            .feed_inbound(&Header::new(b"Subject", b"hi").into())
            .expect("header");
        session.feed_outbound(&Continue.into()).expect("respond");
        session.feed_inbound(&EndOfHeaders.into()).expect("eoh");
        session.feed_outbound(&Continue.into()).expect("respond");
    }

    #[test]
    fn test_negotiation_fixes_parameters() {
        let session = negotiated(
            ProtocolFlags::SKIP,
            ActionFlags::ADD_HEADERS | ActionFlags::QUARANTINE,
        );

        assert_eq!(session.phase(), Phase::Negotiated);
        assert_eq!(session.version(), 6);
        assert_eq!(
            session.actions(),
            ActionFlags::ADD_HEADERS | ActionFlags::QUARANTINE
        );
        assert_eq!(session.protocol(), ProtocolFlags::SKIP);
    }

    #[test]
    fn test_outbound_before_negotiation() {
        let mut session = Session::new();

        let res = session.feed_outbound(&Continue.into());

        assert_matches!(res, Err(SessionError::NotNegotiated));
    }

    #[test]
    fn test_reply_enabling_unoffered_action() {
        let mut session = Session::new();

        let offer = Negotiate {
            actions: ActionFlags::ADD_HEADERS,
            ..Negotiate::default()
        };
        session.feed_inbound(&offer.into()).expect("offer accepted");

        let reply = Negotiate {
            actions: ActionFlags::ADD_HEADERS | ActionFlags::CHANGE_BODY,
            ..Negotiate::default()
        };
        let res = session.feed_outbound(&reply.into());

        assert_matches!(
            res,
            Err(SessionError::Negotiation(NegotiationError::ActionsNotOffered { refused }))
                if refused == ActionFlags::CHANGE_BODY
        );
    }

    #[test]
    fn test_envelope_before_connect() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        let res = session.feed_inbound(&EnvelopeFrom::from(b"a@b".as_slice()).into());

        assert_matches!(res, Err(SessionError::Unexpected { code: 'K', .. }));
        assert_eq!(session.phase(), Phase::Negotiated);
    }

    #[test]
    fn test_event_while_response_pending() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        session.feed_inbound(&connect()).expect("connect accepted");
        let res = session.feed_inbound(&Helo::from(b"mx".as_slice()).into());

        assert_matches!(res, Err(SessionError::Unexpected { .. }));
    }

    #[test]
    fn test_waived_response_is_not_expected() {
        let mut session = negotiated(ProtocolFlags::NR_CONNECT, ActionFlags::all());

        session.feed_inbound(&connect()).expect("connect accepted");

        // No response may be sent for connect, and the next event is
        // accepted right away.
        let res = session.feed_outbound(&Continue.into());
        assert_matches!(res, Err(SessionError::Unexpected { .. }));

        session
            .feed_inbound(&Helo::from(b"mx".as_slice()).into())
            .expect("helo accepted without a connect response");
    }

    #[test]
    fn test_opted_out_event_must_not_arrive() {
        let mut session = negotiated(ProtocolFlags::NO_HELO, ActionFlags::all());

        session.feed_inbound(&connect()).expect("connect accepted");
        session.feed_outbound(&Continue.into()).expect("respond");

        let res = session.feed_inbound(&Helo::from(b"mx".as_slice()).into());

        assert_matches!(res, Err(SessionError::Unexpected { code: 'H', .. }));
    }

    #[test]
    fn test_modification_window() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::ADD_HEADERS);

        advance_to_body(&mut session);

        // Too early: the body is not finished.
        let res = session.feed_outbound(&AddHeader::new(b"X-Test", b"ok").into());
        assert_matches!(res, Err(SessionError::Unexpected { .. }));

        session
            .feed_inbound(&EndOfMessage::default().into())
            .expect("eom");
        assert_eq!(session.phase(), Phase::AwaitingEom);

        session
            .feed_outbound(&AddHeader::new(b"X-Test", b"ok").into())
            .expect("add header in window");

        // Quarantine was not negotiated.
        let res = session.feed_outbound(&Quarantine::new(b"spam").into());
        assert_matches!(res, Err(SessionError::Unexpected { code: 'q', .. }));

        session
            .feed_outbound(&Continue.into())
            .expect("final verdict");
        assert_eq!(session.phase(), Phase::Greeted);
        assert_eq!(session.recipients(), 0);
    }

    #[test]
    fn test_skip_requires_negotiation_and_body() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());
        advance_to_body(&mut session);

        session
            .feed_inbound(&Body::from(b"chunk".as_slice()).into())
            .expect("body chunk");
        let res = session.feed_outbound(&Skip.into());

        assert_matches!(res, Err(SessionError::Unexpected { code: 's', .. }));
    }

    #[test]
    fn test_skip_latches_until_end_of_message() {
        let mut session = negotiated(ProtocolFlags::SKIP, ActionFlags::all());
        advance_to_body(&mut session);

        session
            .feed_inbound(&Body::from(b"chunk".as_slice()).into())
            .expect("body chunk");
        session.feed_outbound(&Skip.into()).expect("skip accepted");

        // Further chunks are a violation, the final event is not.
        let res = session.feed_inbound(&Body::from(b"more".as_slice()).into());
        assert_matches!(res, Err(SessionError::Unexpected { code: 'B', .. }));

        session
            .feed_inbound(&EndOfMessage::default().into())
            .expect("eom after skip");
    }

    #[test]
    fn test_abort_resets_transaction() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());
        advance_to_body(&mut session);

        session.feed_inbound(&Abort.into()).expect("abort");

        assert_eq!(session.phase(), Phase::Greeted);
        assert_eq!(session.recipients(), 0);

        // The next transaction starts from the envelope again.
        session
            .feed_inbound(&EnvelopeFrom::from(b"x@y".as_slice()).into())
            .expect("new transaction");
    }

    #[test]
    fn test_close_is_terminal() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        session.feed_inbound(&Close.into()).expect("close");

        assert_eq!(session.phase(), Phase::Closed);
        assert_matches!(
            session.feed_inbound(&connect()),
            Err(SessionError::Unexpected { .. })
        );
        assert_matches!(
            session.feed_outbound(&Continue.into()),
            Err(SessionError::Unexpected { .. })
        );
    }

    #[test]
    fn test_macro_attaches_to_next_event() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        session
            .feed_inbound(&Macro::new(b'C', &[(b"j".as_slice(), b"mx1".as_slice())]).into())
            .expect("macro before connect");
        session.feed_inbound(&connect()).expect("connect");
    }

    #[test]
    fn test_responses_are_not_inbound() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        let res = session.feed_inbound(&Continue.into());

        assert_matches!(res, Err(SessionError::Unexpected { code: 'c', .. }));
    }

    #[test]
    fn test_events_are_not_outbound() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        let res = session.feed_outbound(&connect());

        assert_matches!(res, Err(SessionError::Unexpected { code: 'C', .. }));
    }

    #[test]
    fn test_double_response() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        session.feed_inbound(&connect()).expect("connect");
        session.feed_outbound(&Continue.into()).expect("respond");

        let res = session.feed_outbound(&Continue.into());

        assert_matches!(res, Err(SessionError::Unexpected { .. }));
    }

    #[test]
    fn test_unimplemented_opt_in() {
        let mut session = negotiated(ProtocolFlags::empty(), ActionFlags::all());

        let frame = Message::parse(bytes::BytesMut::from_iter([0xFFu8, 1, 2]))
            .expect("unknown codes parse");
        assert_matches!(
            session.feed_inbound(&frame),
            Err(SessionError::Unexpected { .. })
        );

        session.set_accept_unimplemented(true);
        session.feed_inbound(&frame).expect("tolerated");
    }
}
