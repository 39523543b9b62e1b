//! Text command protocol spoken over datagrams.
//!
//! One datagram carries one command or one reply. Multi-line reply bodies
//! (simulation reports, the command reference) are delimited by
//! [`BEGIN_RESULT`]/[`END_RESULT`] markers so the client can extract the
//! payload regardless of how the reply was fragmented in transit.

/// Marker opening a wrapped reply body.
pub const BEGIN_RESULT: &str = "BEGIN_RESULT";
/// Marker closing a wrapped reply body.
pub const END_RESULT: &str = "END_RESULT";

/// Marker opening the machine-parsable trajectory block inside a report.
pub const TRAJECTORY_DATA_START: &str = "TRAJECTORY_DATA_START";
/// Marker closing the machine-parsable trajectory block.
pub const TRAJECTORY_DATA_END: &str = "TRAJECTORY_DATA_END";

/// Reply to a successful authentication.
pub const OK: &str = "OK";
/// Acknowledgement of a terminate command.
pub const BYE: &str = "BYE";

pub const ERR_NOT_AUTHENTICATED: &str =
    "ERROR Non autenticato. Invia prima: AUTH username password";
pub const ERR_UNKNOWN_COMMAND: &str =
    "ERROR Comando sconosciuto. Usa HELP per la lista comandi.";
pub const ERR_AUTH_FORMAT: &str = "ERROR Formato: AUTH username password";
pub const ERR_TOO_MANY_ATTEMPTS: &str =
    "ERROR Troppi tentativi falliti. Riprova piu' tardi.";
pub const ERR_SESSION_LOCKED: &str =
    "ERROR Troppi tentativi falliti. Sessione bloccata.";

/// Command reference returned for `HELP`, without the result markers.
pub const HELP_TEXT: &str = "\
=== COMANDI DISPONIBILI ===
SIMULATE velocity angle mass dragCoeff
  - velocity: velocita' iniziale in m/s (> 0)
  - angle: angolo di lancio in gradi (0-90)
  - mass: massa del proiettile in kg (> 0)
  - dragCoeff: coefficiente di drag (> 0, tipico 0.47 per sfere)

HELP  - Mostra questo messaggio
QUIT  - Disconnetti dal server";

/// One inbound datagram body, classified into the closed command set.
///
/// Classification is purely syntactic; authentication checks and numeric
/// validation of `SIMULATE` arguments belong to server dispatch so each
/// failure mode keeps its distinct reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Auth { user: String, pass: String },
    /// `AUTH` was recognized but the argument arity was wrong.
    AuthMalformed,
    /// Raw whitespace-separated tokens following `SIMULATE `.
    Simulate { args: Vec<String> },
    Help,
    Quit,
    Unknown,
}

impl Command {
    /// Classifies one trimmed datagram body.
    ///
    /// `AUTH ` and `SIMULATE ` prefixes are case-sensitive; `QUIT`, `EXIT`
    /// and `HELP` match case-insensitively. The password is everything after
    /// the first space of the `AUTH` arguments, so it may contain spaces.
    pub fn parse(message: &str) -> Command {
        let message = message.trim();

        if let Some(rest) = message.strip_prefix("AUTH ") {
            let mut parts = rest.trim().splitn(2, ' ');
            return match (parts.next(), parts.next()) {
                (Some(user), Some(pass)) if !user.is_empty() && !pass.trim().is_empty() => {
                    Command::Auth {
                        user: user.trim().to_string(),
                        pass: pass.trim().to_string(),
                    }
                }
                _ => Command::AuthMalformed,
            };
        }

        if message.eq_ignore_ascii_case("QUIT") || message.eq_ignore_ascii_case("EXIT") {
            Command::Quit
        } else if let Some(rest) = message.strip_prefix("SIMULATE ") {
            Command::Simulate {
                args: rest.split_whitespace().map(str::to_string).collect(),
            }
        } else if message.eq_ignore_ascii_case("HELP") {
            Command::Help
        } else {
            Command::Unknown
        }
    }
}

/// Wraps a reply body between the result markers.
pub fn wrap_result(body: &str) -> String {
    format!("{BEGIN_RESULT}\n{body}\n{END_RESULT}")
}

/// Extracts the content between the result markers.
///
/// Returns the trimmed content followed by a newline, or the reply unchanged
/// when the markers are absent (partial reassembly may have dropped them).
pub fn extract_result(reply: &str) -> String {
    match (reply.find(BEGIN_RESULT), reply.find(END_RESULT)) {
        (Some(begin), Some(end)) if end >= begin + BEGIN_RESULT.len() => {
            let content = reply[begin + BEGIN_RESULT.len()..end].trim();
            format!("{content}\n")
        }
        _ => reply.to_string(),
    }
}
