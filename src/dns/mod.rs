//! Minimal DNS wire-format codec.
//!
//! The blocklist engine and request pipeline (see `crate::server`) specify
//! only the semantic request/response they exchange with a codec; the codec
//! itself is out of scope for the engine but still has to exist for the
//! server to actually speak UDP/53. This module covers exactly the subset
//! of RFC 1035 section 4 that a single-question, class IN, type A query
//! needs: header, question, and A-record answers. Anything past the
//! question section of an incoming packet (EDNS OPT, additional records) is
//! ignored rather than parsed.

mod common;
mod enums;
mod header;
mod packet;
mod question;
mod resource;

pub use common::PacketComponent;
pub use enums::{DnsResourceClass, DnsResourceType, ResponseCode};
pub use header::DnsHeader;
pub use packet::DnsPacket;
pub use question::DnsQuestion;
pub use resource::DnsResourceRecord;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("packet too short")]
    Truncated,
    #[error("invalid label")]
    InvalidLabel,
    #[error("packet carries no question section")]
    NoQuestion,
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e.to_string())
    }
}
