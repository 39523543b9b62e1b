//! Per-datagram command dispatch.
//!
//! Each inbound datagram is one independent unit of work: the sender's
//! session is resolved (or lazily created), the payload is classified into
//! a command, and exactly one reply is produced. Nothing here touches the
//! socket; the network layer owns all sends.

use crate::calculator;
use crate::credentials::Credentials;
use crate::formatter;
use crate::session::{SessionState, SessionStore};
use log::{debug, info, warn};
use shared::protocol::{self, Command};
use shared::ProjectileParams;
use std::net::SocketAddr;

/// Failed attempts after which a session is locked until it expires.
pub const MAX_AUTH_ATTEMPTS: u32 = 3;

/// Processes one datagram and returns the single reply for it.
pub async fn handle_datagram(
    store: &SessionStore,
    credentials: &Credentials,
    payload: &[u8],
    addr: SocketAddr,
) -> String {
    let text = String::from_utf8_lossy(payload);
    let message = text.trim();
    debug!("Received '{}' from {}", message, addr);

    let session = store.get_or_create(addr).await;

    match Command::parse(message) {
        Command::Auth { user, pass } => {
            let mut state = session.state.lock().await;
            state.touch();
            authenticate(&mut state, credentials, &user, &pass, addr)
        }
        Command::AuthMalformed => {
            let mut state = session.state.lock().await;
            state.touch();
            if state.authenticated {
                already_authenticated(&state)
            } else if state.failed_attempts >= MAX_AUTH_ATTEMPTS {
                protocol::ERR_TOO_MANY_ATTEMPTS.to_string()
            } else {
                protocol::ERR_AUTH_FORMAT.to_string()
            }
        }
        Command::Quit => {
            {
                let mut state = session.state.lock().await;
                state.touch();
                let who = state.username.clone().unwrap_or_else(|| addr.to_string());
                info!("Client '{}' disconnected", who);
            }
            store.remove(&addr).await;
            protocol::BYE.to_string()
        }
        Command::Simulate { args } => {
            // Snapshot under the lock, then run the simulation outside it so
            // a long integration never blocks this endpoint's sweep checks.
            let (authenticated, username) = refresh(&session.state).await;
            if !authenticated {
                return protocol::ERR_NOT_AUTHENTICATED.to_string();
            }
            simulate_reply(&args, username.as_deref())
        }
        Command::Help => {
            let (authenticated, _) = refresh(&session.state).await;
            if !authenticated {
                return protocol::ERR_NOT_AUTHENTICATED.to_string();
            }
            protocol::wrap_result(protocol::HELP_TEXT)
        }
        Command::Unknown => {
            let (authenticated, _) = refresh(&session.state).await;
            if !authenticated {
                protocol::ERR_NOT_AUTHENTICATED.to_string()
            } else {
                protocol::ERR_UNKNOWN_COMMAND.to_string()
            }
        }
    }
}

/// Touches the session and snapshots what command handling needs.
async fn refresh(state: &tokio::sync::Mutex<SessionState>) -> (bool, Option<String>) {
    let mut state = state.lock().await;
    state.touch();
    (state.authenticated, state.username.clone())
}

fn already_authenticated(state: &SessionState) -> String {
    format!(
        "OK Gia' autenticato come {}",
        state.username.as_deref().unwrap_or("")
    )
}

fn authenticate(
    state: &mut SessionState,
    credentials: &Credentials,
    user: &str,
    pass: &str,
    addr: SocketAddr,
) -> String {
    if state.authenticated {
        return already_authenticated(state);
    }

    // Locked sessions are refused before any credential check.
    if state.failed_attempts >= MAX_AUTH_ATTEMPTS {
        return protocol::ERR_TOO_MANY_ATTEMPTS.to_string();
    }

    if credentials.verify(user, pass) {
        state.username = Some(user.to_string());
        state.authenticated = true;
        state.failed_attempts = 0;
        info!("User '{}' authenticated from {}", user, addr);
        protocol::OK.to_string()
    } else {
        state.failed_attempts += 1;
        let remaining = MAX_AUTH_ATTEMPTS.saturating_sub(state.failed_attempts);
        if remaining > 0 {
            warn!(
                "Failed authentication from {}, {} attempts remaining",
                addr, remaining
            );
            format!("ERROR Credenziali non valide. Tentativi rimasti: {remaining}")
        } else {
            warn!("Session locked for {}", addr);
            protocol::ERR_SESSION_LOCKED.to_string()
        }
    }
}

fn simulate_reply(args: &[String], username: Option<&str>) -> String {
    if args.len() != 4 {
        return protocol::wrap_result("ERROR Formato: SIMULATE velocity angle mass dragCoeff");
    }

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(args) {
        match raw.parse::<f64>() {
            Ok(value) => *slot = value,
            Err(_) => {
                return protocol::wrap_result("ERROR Parametri devono essere numeri validi");
            }
        }
    }

    let params = ProjectileParams::new(values[0], values[1], values[2], values[3]);
    if let Err(violations) = params.validate() {
        return protocol::wrap_result(&format!("ERROR Parametri invalidi: {violations}"));
    }

    info!(
        "Simulation requested by '{}': v={}, angle={}, mass={}, cd={}",
        username.unwrap_or("?"),
        params.speed,
        params.angle_deg,
        params.mass,
        params.drag_coeff
    );

    let result = calculator::simulate(&params);
    protocol::wrap_result(&formatter::format_report(&result))
}
