//! Client session driving the authenticate/request/disconnect protocol.
//!
//! The client is strictly request/response: one datagram out, one reply in
//! (possibly fragmented), one outstanding request at a time. The first
//! reply datagram is awaited under the primary timeout; once a fragmented
//! reply is detected, collection switches to the shorter per-fragment
//! timeout and the primary regime is restored when reassembly concludes.

use crate::error::ClientError;
use log::{debug, warn};
use shared::fragment::{self, FragmentBuffer};
use shared::protocol;
use shared::{ProjectileParams, RECV_BUFFER_SIZE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

/// Connection lifecycle of a client instance.
///
/// `Disconnected` is terminal: after [`Client::disconnect`] a new request
/// cycle starts from [`Client::connect`] again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connected,
    Authenticated,
}

/// One client endpoint speaking to one server.
pub struct Client {
    server: String,
    socket: Option<UdpSocket>,
    server_addr: Option<SocketAddr>,
    state: ClientState,
    request_timeout: Duration,
    fragment_timeout: Duration,
}

impl Client {
    /// Primary timeout for the first datagram of any reply.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    /// Shorter timeout applied per fragment during reassembly.
    pub const FRAGMENT_TIMEOUT: Duration = Duration::from_secs(5);
    // How long a best-effort disconnect waits for the acknowledgement.
    const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Creates a disconnected client for `server` (`host:port`).
    pub fn new(server: &str) -> Self {
        Self {
            server: server.to_string(),
            socket: None,
            server_addr: None,
            state: ClientState::Disconnected,
            request_timeout: Self::REQUEST_TIMEOUT,
            fragment_timeout: Self::FRAGMENT_TIMEOUT,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state != ClientState::Disconnected
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == ClientState::Authenticated
    }

    /// Resolves the server address and opens a local endpoint.
    ///
    /// On failure the client stays `Disconnected` and the cause is
    /// reported in the returned error.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        let server_addr = lookup_host(&self.server)
            .await
            .map_err(|_| ClientError::Resolve(self.server.clone()))?
            .next()
            .ok_or_else(|| ClientError::Resolve(self.server.clone()))?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        debug!(
            "Local endpoint {} -> server {}",
            socket.local_addr()?,
            server_addr
        );

        self.socket = Some(socket);
        self.server_addr = Some(server_addr);
        self.state = ClientState::Connected;
        Ok(())
    }

    /// Sends the credentials and awaits one reply.
    ///
    /// Transitions to `Authenticated` only on an `OK` reply; the server's
    /// reply text is returned either way so the caller can show it.
    pub async fn authenticate(&mut self, user: &str, pass: &str) -> Result<String, ClientError> {
        if self.state == ClientState::Disconnected {
            return Err(ClientError::NotConnected);
        }

        let reply = self.send_and_receive(&format!("AUTH {user} {pass}")).await?;
        if reply.starts_with(protocol::OK) {
            self.state = ClientState::Authenticated;
        }
        Ok(reply)
    }

    /// Requests a trajectory simulation.
    ///
    /// Valid only when authenticated; the parameters are validated locally
    /// before any datagram is sent.
    pub async fn send_simulation(
        &mut self,
        params: &ProjectileParams,
    ) -> Result<String, ClientError> {
        if self.state != ClientState::Authenticated {
            return Err(ClientError::NotAuthenticated);
        }
        params.validate()?;

        let reply = self.send_and_receive(&params.to_command_string()).await?;
        Ok(protocol::extract_result(&reply))
    }

    /// Requests the server's command reference; valid only when
    /// authenticated.
    pub async fn send_help(&mut self) -> Result<String, ClientError> {
        if self.state != ClientState::Authenticated {
            return Err(ClientError::NotAuthenticated);
        }

        let reply = self.send_and_receive("HELP").await?;
        Ok(protocol::extract_result(&reply))
    }

    /// Best-effort terminate: sends `QUIT`, waits briefly for the
    /// acknowledgement and discards it, then releases the local endpoint.
    /// Never fails observably.
    pub async fn disconnect(&mut self) {
        if let (Some(socket), Some(server_addr)) = (&self.socket, self.server_addr) {
            if socket.send_to(b"QUIT", server_addr).await.is_ok() {
                let mut buffer = [0u8; 256];
                let _ = timeout(Self::DISCONNECT_TIMEOUT, socket.recv_from(&mut buffer)).await;
            }
        }

        self.socket = None;
        self.server_addr = None;
        self.state = ClientState::Disconnected;
    }

    /// Sends one command and awaits the full reply, reassembling fragments
    /// when the first datagram carries the fragment prefix.
    async fn send_and_receive(&self, message: &str) -> Result<String, ClientError> {
        let socket = self.socket.as_ref().ok_or(ClientError::NotConnected)?;
        let server_addr = self.server_addr.ok_or(ClientError::NotConnected)?;

        socket.send_to(message.as_bytes(), server_addr).await?;

        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        let (len, _) = timeout(self.request_timeout, socket.recv_from(&mut buffer))
            .await
            .map_err(|_| ClientError::Timeout)??;

        let Some((header, payload)) = fragment::parse_fragment(&buffer[..len]) else {
            return Ok(String::from_utf8_lossy(&buffer[..len]).into_owned());
        };

        debug!("Fragmented reply, expecting {} fragments", header.total);
        let mut fragments = FragmentBuffer::new(header.total);
        fragments.insert(header.index, payload);

        // Remaining fragments arrive under the shorter timeout; when it
        // fires, whatever arrived is concatenated best-effort.
        while !fragments.is_complete() {
            let received = timeout(self.fragment_timeout, socket.recv_from(&mut buffer)).await;
            let Ok(result) = received else {
                warn!(
                    "Fragment timeout, received {}/{} fragments",
                    fragments.received(),
                    fragments.total()
                );
                break;
            };

            let (len, _) = result?;
            if let Some((header, payload)) = fragment::parse_fragment(&buffer[..len]) {
                fragments.insert(header.index, payload);
            }
        }

        Ok(String::from_utf8_lossy(&fragments.into_bytes()).into_owned())
    }
}
