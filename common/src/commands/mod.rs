//! SMTP session events reported by the MTA.
//!
//! The MTA streams one event per SMTP phase, from connection info down
//! to individual body chunks. Most events expect a verdict from the
//! filter; see [`crate::session`] for the sequencing rules.

mod body;
mod connect;
mod control;
mod envelope;
mod header;
mod helo;
mod mmacro;
mod unknown;

pub use self::body::{Body, EndOfMessage};
pub use self::connect::{Connect, Family};
pub use self::control::{Abort, Close};
pub use self::envelope::{Data, EnvelopeFrom, EnvelopeRecipient};
pub use self::header::{EndOfHeaders, Header};
pub use self::helo::Helo;
pub use self::mmacro::Macro;
pub use self::unknown::Unknown;
