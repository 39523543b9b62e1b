//! Per-endpoint session tracking with idle expiry.
//!
//! The transport is connectionless, so the only identity a client has is
//! its source endpoint. Sessions are created lazily on the first datagram
//! from an unseen endpoint and carry the authentication state across
//! otherwise independent datagrams.
//!
//! The store holds its outer lock only to look up or insert the `Arc`;
//! every mutation happens under the per-session lock, so dispatch workers
//! handling unrelated endpoints never serialize on each other, and no lock
//! is ever held across a network operation.

use log::debug;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Mutable per-endpoint state, guarded by its own lock.
#[derive(Debug)]
pub struct SessionState {
    /// Set only after a successful authentication.
    pub username: Option<String>,
    /// Monotonic false -> true for the lifetime of the session.
    pub authenticated: bool,
    /// Consecutive failed authentication attempts.
    pub failed_attempts: u32,
    /// Refreshed on every inbound datagram from this endpoint.
    pub last_activity: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            username: None,
            authenticated: false,
            failed_attempts: 0,
            last_activity: Instant::now(),
        }
    }

    /// Refreshes the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// One client session, keyed by the sender endpoint.
#[derive(Debug)]
pub struct Session {
    pub addr: SocketAddr,
    pub state: Mutex<SessionState>,
}

/// Concurrent endpoint -> session map owning the expiry policy.
pub struct SessionStore {
    sessions: RwLock<HashMap<SocketAddr, Arc<Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Returns the session for `addr`, creating it on first contact.
    ///
    /// Concurrent calls for the same endpoint always observe the same
    /// session object; the entry API under the write lock makes the
    /// insert atomic.
    pub async fn get_or_create(&self, addr: SocketAddr) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(&addr) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(addr).or_insert_with(|| {
            debug!("New session for {}", addr);
            Arc::new(Session {
                addr,
                state: Mutex::new(SessionState::new()),
            })
        }))
    }

    /// Removes the session for `addr`; true when one existed.
    pub async fn remove(&self, addr: &SocketAddr) -> bool {
        self.sessions.write().await.remove(addr).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Evicts every session idle past the timeout; returns how many were
    /// removed. A session currently locked by a worker is active by
    /// definition and is left alone.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let idle_timeout = self.idle_timeout;

        sessions.retain(|_, session| match session.state.try_lock() {
            Ok(state) => state.last_activity.elapsed() <= idle_timeout,
            Err(_) => true,
        });

        before - sessions.len()
    }
}
