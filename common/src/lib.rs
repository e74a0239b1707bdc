#![doc = include_str!("../Readme.md")]
#![warn(missing_docs)]

pub mod codec;
pub mod commands;
pub mod decoding;
pub mod encoding;
pub mod misc;
pub mod modifications;
pub mod optneg;
pub mod responses;
pub mod session;

mod error;

pub use decoding::{Message, MessageFamily};
pub use error::{InvalidData, NotEnoughData, ProtocolError};
pub use session::{Phase, Session, SessionError};
