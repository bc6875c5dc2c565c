//! # Chat Server Library
//!
//! This library implements the server side of a line-oriented multi-user
//! chat service over TCP. It accepts connections, negotiates unique
//! usernames, and routes broadcast, private, and informational messages
//! between connected clients.
//!
//! ## Architecture
//!
//! One tokio task per accepted connection runs the session state machine
//! (`AWAITING_NAME → ACTIVE → CLOSED`), all sharing a single lock-guarded
//! registry. Delivery between sessions goes through per-session outbound
//! channels: a sender queues a line on the recipient's channel and the
//! recipient's own writer task puts it on the wire, so no task ever
//! touches another session's socket and per-recipient order is preserved.
//!
//! ## Module Organization
//!
//! - [`registry`]: active-session set and the authoritative username
//!   index, mutated atomically under one `RwLock`.
//! - [`session`]: per-connection negotiation, command loop, and
//!   idempotent teardown.
//! - [`command`]: input parsing into a closed command set and the router
//!   that executes each command against the registry.
//! - [`format`]: ANSI presentation for the message kinds.
//! - [`facts`]: the random penguin-fact provider behind `PENGU`.
//! - [`network`]: the TCP accept loop with its live-session cap.
//!
//! ## Failure isolation
//!
//! Per-session I/O failures are treated as implicit logouts and never
//! propagate to the accept loop or to other sessions. The only fatal
//! errors are configuration and bind failures, both raised before the
//! first connection is accepted.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::ChatServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ChatServer::bind("0.0.0.0:3000").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod facts;
pub mod format;
pub mod network;
pub mod registry;
pub mod session;
