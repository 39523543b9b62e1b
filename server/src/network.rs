//! Server network layer: UDP socket, worker pool and background tasks.
//!
//! One receive loop reads the socket sequentially and feeds a bounded
//! channel; a fixed pool of workers drains it and dispatches each datagram
//! independently. A single sender task owns every outbound datagram, which
//! keeps the fragments of one reply ordered on the wire even while other
//! workers are producing replies. A sweeper task evicts idle sessions.

use crate::credentials::Credentials;
use crate::dispatch;
use crate::session::SessionStore;
use log::{debug, error, info, warn};
use shared::{fragment, MAX_DATAGRAM_PAYLOAD, RECV_BUFFER_SIZE};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout_at, Instant};

/// Tunables for the server runtime. The fragment pacing and sweep timings
/// are empirically chosen; nothing depends on their exact values.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Fixed number of dispatch workers.
    pub workers: usize,
    /// Inbound datagrams queued before the receive loop blocks; the OS
    /// receive buffer absorbs anything beyond that.
    pub queue_depth: usize,
    /// Idle time after which a session is swept.
    pub session_timeout: Duration,
    /// Period of the expiry sweep task.
    pub sweep_interval: Duration,
    /// Pause between consecutive fragments of one reply.
    pub fragment_delay: Duration,
    /// Largest payload sent as a single datagram.
    pub max_payload: usize,
    /// How long workers get to drain on shutdown before being aborted.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_depth: 64,
            session_timeout: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
            fragment_delay: Duration::from_millis(5),
            max_payload: MAX_DATAGRAM_PAYLOAD,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

struct InboundDatagram {
    payload: Vec<u8>,
    addr: SocketAddr,
}

struct OutboundReply {
    text: String,
    addr: SocketAddr,
}

/// UDP server for the trajectory protocol.
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<SessionStore>,
    credentials: Arc<Credentials>,
    config: ServerConfig,
    shutdown: Notify,
}

impl Server {
    pub async fn new(
        addr: &str,
        credentials: Credentials,
        config: ServerConfig,
    ) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            sessions: Arc::new(SessionStore::new(config.session_timeout)),
            credentials: Arc::new(credentials),
            config,
            shutdown: Notify::new(),
        })
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Requests shutdown. Idempotent and safe to call from any task,
    /// including a signal handler.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Runs the server until [`Server::shutdown`] is triggered, then drains
    /// the worker pool within the configured grace period.
    pub async fn run(&self) -> io::Result<()> {
        let (datagram_tx, datagram_rx) = mpsc::channel::<InboundDatagram>(self.config.queue_depth);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel::<OutboundReply>();

        let mut sender = self.spawn_sender(reply_rx);
        let workers = self.spawn_workers(datagram_rx, reply_tx);
        let sweeper = self.spawn_sweeper();

        // Single receive point: datagrams leave the socket sequentially and
        // queue toward the worker pool. The bounded channel is the
        // backpressure boundary.
        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown requested, draining workers");
                    break;
                }
                received = self.socket.recv_from(&mut buffer) => {
                    match received {
                        Ok((len, addr)) => {
                            let datagram = InboundDatagram {
                                payload: buffer[..len].to_vec(),
                                addr,
                            };
                            if datagram_tx.send(datagram).await.is_err() {
                                error!("Worker pool stopped, closing receive loop");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Error receiving datagram: {}", e);
                            sleep(Duration::from_millis(10)).await;
                        }
                    }
                }
            }
        }

        // Closing the inbound channel lets workers finish what is queued.
        drop(datagram_tx);
        let deadline = Instant::now() + self.config.shutdown_grace;
        for mut worker in workers {
            if timeout_at(deadline, &mut worker).await.is_err() {
                warn!("Worker did not drain within the grace period, aborting");
                worker.abort();
            }
        }

        sweeper.abort();

        // With every worker gone the reply channel is closed; give the
        // sender the rest of the grace period to flush.
        if timeout_at(deadline, &mut sender).await.is_err() {
            warn!("Sender did not flush within the grace period, aborting");
            sender.abort();
        }

        info!("Server stopped");
        Ok(())
    }

    fn spawn_workers(
        &self,
        datagram_rx: mpsc::Receiver<InboundDatagram>,
        reply_tx: mpsc::UnboundedSender<OutboundReply>,
    ) -> Vec<JoinHandle<()>> {
        let datagram_rx = Arc::new(Mutex::new(datagram_rx));

        (0..self.config.workers)
            .map(|worker_id| {
                let datagram_rx = Arc::clone(&datagram_rx);
                let reply_tx = reply_tx.clone();
                let sessions = Arc::clone(&self.sessions);
                let credentials = Arc::clone(&self.credentials);

                tokio::spawn(async move {
                    loop {
                        let next = { datagram_rx.lock().await.recv().await };
                        let Some(InboundDatagram { payload, addr }) = next else {
                            break;
                        };

                        let reply =
                            dispatch::handle_datagram(&sessions, &credentials, &payload, addr)
                                .await;
                        if reply_tx.send(OutboundReply { text: reply, addr }).is_err() {
                            break;
                        }
                    }
                    debug!("Worker {} stopped", worker_id);
                })
            })
            .collect()
    }

    /// The sender serializes all outbound traffic, so one reply's fragment
    /// sequence is never interleaved with another worker's fragments to the
    /// same destination.
    fn spawn_sender(&self, mut reply_rx: mpsc::UnboundedReceiver<OutboundReply>) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let max_payload = self.config.max_payload;
        let fragment_delay = self.config.fragment_delay;

        tokio::spawn(async move {
            while let Some(OutboundReply { text, addr }) = reply_rx.recv().await {
                let datagrams = fragment::split(text.as_bytes(), max_payload);
                let fragmented = datagrams.len() > 1;
                if fragmented {
                    debug!("Reply to {} split into {} fragments", addr, datagrams.len());
                }

                for (i, datagram) in datagrams.iter().enumerate() {
                    if let Err(e) = socket.send_to(datagram, addr).await {
                        // No reply is possible for this datagram; log and move on.
                        error!("Failed to send to {}: {}", addr, e);
                        break;
                    }
                    // Pace fragments to reduce back-to-back loss.
                    if fragmented && i + 1 < datagrams.len() {
                        sleep(fragment_delay).await;
                    }
                }
            }
        })
    }

    fn spawn_sweeper(&self) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        let sweep_interval = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = interval(sweep_interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = sessions.sweep_expired().await;
                if removed > 0 {
                    info!(
                        "Removed {} expired sessions, {} still active",
                        removed,
                        sessions.len().await
                    );
                }
            }
        })
    }
}
