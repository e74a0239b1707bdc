//! Verdicts the filter returns to the MTA.
//!
//! Most events expect exactly one of these in answer. All of them are
//! empty on the wire except [`ReplyCode`], which carries an SMTP status
//! line.

mod replycode;
mod verdict;

pub use self::replycode::ReplyCode;
pub use self::verdict::{Accept, Continue, Discard, Reject, Skip, TemporaryFailure};
