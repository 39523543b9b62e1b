//! # Ballistic Trajectory Client Library
//!
//! Client side of the connectionless trajectory protocol. The transport
//! delivers discrete, possibly-lost, possibly-reordered datagrams; this
//! crate makes that look like a stateful request/response exchange with
//! bounded wait times.
//!
//! ## How a request flows
//!
//! Every public operation on [`network::Client`] sends one command datagram
//! and awaits the reply under the primary timeout. When the server's reply
//! exceeds the safe datagram size it arrives as a sequence of
//! `FRAG:<i>/<N>:` chunks: the client detects the prefix on the first
//! datagram, switches to a shorter per-fragment timeout, and concatenates
//! whatever fragments arrive. A lost fragment degrades the report instead
//! of failing the request.
//!
//! ## Module Organization
//!
//! - [`network`]: the `Disconnected -> Connected -> Authenticated` session
//!   state machine and the request/reassembly loop
//! - [`trajectory_data`]: truncation-tolerant parser for the structured
//!   block that plotting front-ends consume
//! - [`error`]: typed failures, with timeouts distinguishable from misuse
//!   and socket errors

pub mod error;
pub mod network;
pub mod trajectory_data;

pub use error::ClientError;
pub use network::{Client, ClientState};
