//! Requests to modify the accepted mail
//!
//! Only after the end-of-message event may the filter respond with
//! change requests, and only with those whose action flag was granted
//! during option negotiation. [`crate::session::Session`] enforces
//! both rules.

mod body;
mod headers;
mod progress;
mod quarantine;
mod recipients;
mod sender;

pub use self::body::ReplaceBody;
pub use self::headers::{AddHeader, ChangeHeader, InsertHeader};
pub use self::progress::Progress;
pub use self::quarantine::Quarantine;
pub use self::recipients::{AddRecipient, AddRecipientPar, RemoveRecipient};
pub use self::sender::ChangeSender;
