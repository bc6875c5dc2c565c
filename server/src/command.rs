//! Line parsing and command dispatch for active sessions.
//!
//! Each input line is parsed at the boundary into a closed [`Command`]
//! variant, then dispatched exhaustively by the [`CommandRouter`]. Parse
//! and routing failures are reported back to the requesting client as an
//! error line and never affect session state or other users.

use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::facts::FactProvider;
use crate::format;
use crate::registry::{SessionHandle, SharedRegistry};

/// Date format for `connected since` entries in the roster listing.
const TIMESTAMP_FORMAT: &str = "%A, %d.%m.%Y %H:%M";

/// One line of active-session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain message, delivered to every other active session.
    Broadcast(String),
    /// An `@recipient body` line, delivered to the recipient only.
    Private { recipient: String, body: String },
    /// A `WHOIS` request; the roster listing goes to the requester only.
    Roster,
    /// A `LOGOUT` request; the server says goodbye and closes.
    Logout,
    /// A `PENGU` request for one random fact.
    Fact,
}

/// Malformed input, reported to the requester as an error line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// `@name` without a space-separated message body.
    #[error("Must supply a message")]
    MissingBody,
}

impl Command {
    /// Parses one input line.
    ///
    /// Blank lines parse to `None` and are ignored by the caller. The
    /// private-message recipient is the substring between `@` and the
    /// first space; an `@` line without any space has no body to deliver.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        if let Some(rest) = line.strip_prefix('@') {
            let Some(split) = rest.find(' ') else {
                return Err(ParseError::MissingBody);
            };
            let (recipient, body) = rest.split_at(split);
            return Ok(Some(Command::Private {
                recipient: recipient.to_string(),
                body: body[1..].to_string(),
            }));
        }
        Ok(Some(match line {
            "WHOIS" => Command::Roster,
            "LOGOUT" => Command::Logout,
            "PENGU" => Command::Fact,
            _ => Command::Broadcast(line.to_string()),
        }))
    }
}

/// Signals whether the session's command loop should keep running.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Logout,
}

/// Routes parsed commands against the registry on behalf of one session.
#[derive(Clone)]
pub struct CommandRouter {
    registry: SharedRegistry,
    facts: Arc<FactProvider>,
}

impl CommandRouter {
    pub fn new(registry: SharedRegistry, facts: Arc<FactProvider>) -> Self {
        Self { registry, facts }
    }

    /// Performs the registry and delivery work for one command issued by
    /// `sender`.
    pub async fn dispatch(&self, sender: &SessionHandle, command: Command) -> Flow {
        match command {
            Command::Broadcast(msg) => {
                let peers = self.registry.read().await.peers_of(sender.id);
                debug!("{} broadcasts to {} peer(s)", sender.username, peers.len());
                let line = format::broadcast(&sender.username, &msg);
                for peer in peers {
                    peer.send(line.clone());
                }
            }
            Command::Private { recipient, body } => {
                let peer = self.registry.read().await.lookup(&recipient).cloned();
                match peer {
                    Some(peer) => peer.send(format::private(&sender.username, &body)),
                    None => sender.send(format::error(&format!(
                        "{recipient} could not be found!"
                    ))),
                }
            }
            Command::Roster => {
                let mut listing = String::new();
                for (username, connected_since) in self.registry.read().await.roster() {
                    listing.push_str(&format!(
                        "- {} connected since {}\n",
                        username,
                        connected_since.format(TIMESTAMP_FORMAT),
                    ));
                }
                // One send; the newlines render as separate client lines.
                sender.send(listing);
            }
            Command::Fact => {
                sender.send(format::fact(self.facts.random()));
            }
            Command::Logout => {
                sender.send(format::info(&format!("Goodbye {}!", sender.username)));
                return Flow::Logout;
            }
        }
        Flow::Continue
    }

    /// Reports a parse failure back to the sender only.
    pub fn report(&self, sender: &SessionHandle, err: ParseError) {
        sender.send(format::error(&err.to_string()));
    }
}
