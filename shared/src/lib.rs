//! Shared protocol vocabulary for the ballistic trajectory service.
//!
//! Both the server and the client depend on this crate for the text command
//! protocol, the fragmentation codec used for oversized replies, and the
//! validation of projectile launch parameters. Everything here is pure and
//! transport-agnostic; the sockets live in the `server` and `client` crates.

pub mod fragment;
pub mod params;
pub mod protocol;

pub use fragment::{FragmentBuffer, FragmentHeader};
pub use params::{InvalidParams, ProjectileParams};
pub use protocol::Command;

/// Largest reply payload sent as a single datagram. Anything larger goes
/// through the fragmentation codec.
pub const MAX_DATAGRAM_PAYLOAD: usize = 8192;

/// Receive buffer size used on both sides of the protocol.
pub const RECV_BUFFER_SIZE: usize = 65535;
