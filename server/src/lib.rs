//! # Ballistic Trajectory Server Library
//!
//! Server side of the connectionless trajectory-calculation protocol. Every
//! inbound datagram is one independent request; what makes the exchange feel
//! stateful is the per-endpoint session map, which carries authentication
//! state, a failed-attempt counter and an activity timestamp across
//! datagrams from the same address and port.
//!
//! ## Architecture
//!
//! ### Datagram pipeline
//! A single receive loop reads the UDP socket sequentially and feeds a
//! bounded queue. A fixed-size worker pool drains the queue, so requests
//! from different endpoints are processed in parallel while total
//! concurrency stays bounded. Every worker ends its unit of work by
//! queueing exactly one reply toward the dedicated sender task.
//!
//! ### Serialized sending
//! Replies larger than the safe datagram payload are split by the
//! fragmentation codec and sent as a paced sequence of `FRAG:<i>/<N>:`
//! datagrams. The sender task owns the outbound path, which keeps one
//! reply's fragment sequence ordered on the wire regardless of how many
//! workers are producing replies concurrently.
//!
//! ### Session expiry
//! A background sweeper periodically evicts sessions that have been idle
//! past the configured timeout. The sweeper and the workers coordinate only
//! through the session store's own locking; neither ever blocks the other
//! for the duration of a network call.
//!
//! ## Module Organization
//!
//! - [`session`]: concurrent endpoint-keyed session store with idle expiry
//! - [`dispatch`]: per-datagram command handling and authentication rules
//! - [`network`]: socket, worker pool, sender and sweeper tasks, shutdown
//! - [`credentials`]: file-backed user table with preset fallback accounts
//! - [`calculator`]: fixed-step trajectory integration under quadratic drag
//! - [`formatter`]: report rendering, ASCII plot and the structured block
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::credentials::Credentials;
//! use server::network::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::defaults();
//!     let server = Arc::new(
//!         Server::new("127.0.0.1:5000", credentials, ServerConfig::default()).await?,
//!     );
//!
//!     // Trigger `server.shutdown()` from a signal handler for a graceful stop.
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod calculator;
pub mod credentials;
pub mod dispatch;
pub mod formatter;
pub mod network;
pub mod session;
