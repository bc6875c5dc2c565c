//! Per-connection session handling.
//!
//! A session moves through three states: awaiting a username, active, and
//! closed. The username negotiation re-prompts indefinitely until a valid,
//! unclaimed name arrives; only then does the session become visible to the
//! rest of the server. Teardown is idempotent and runs on every exit path,
//! so an abrupt disconnect behaves exactly like an explicit logout.
//!
//! Sessions are generic over the transport so tests can drive one through
//! an in-memory duplex stream instead of a TCP socket.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shared::{ENTER_USERNAME, VALID};

use crate::command::{Command, CommandRouter, Flow};
use crate::facts::FactProvider;
use crate::format;
use crate::registry::{SessionHandle, SessionId, SharedRegistry};

/// Runs one connection from accept to teardown.
pub async fn run<S>(
    id: SessionId,
    transport: S,
    registry: SharedRegistry,
    facts: Arc<FactProvider>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(transport);
    let mut lines = BufReader::new(reader).lines();
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer_task = spawn_writer(writer, rx);

    if let Some(handle) = negotiate_username(id, &mut lines, &tx, &registry).await {
        handle.send(VALID.to_string());
        handle.send(format::info(&format!("Welcome {}!", handle.username)));
        deliver_to_peers(
            &registry,
            &handle,
            format::info(&format!("{} joined the chat!", handle.username)),
        )
        .await;
        info!("session {id} active as {:?}", handle.username);

        let router = CommandRouter::new(Arc::clone(&registry), facts);
        active_loop(&mut lines, &router, &handle).await;

        // Exactly-once teardown. Deregister is idempotent and the
        // departure notice uses the username captured before removal;
        // the name is free for reuse as soon as the lock is released.
        let departed = registry.write().await.deregister(id);
        if let Some(handle) = departed {
            deliver_to_peers(
                &registry,
                &handle,
                format::info(&format!("{} has left the chat!", handle.username)),
            )
            .await;
        }
    }

    // Drop the last senders so the writer drains any queued lines (the
    // goodbye, for one) and then closes the connection.
    drop(tx);
    drop(lines);
    if let Err(e) = writer_task.await {
        warn!("session {id}: writer task failed: {e}");
    }
    info!("session {id} closed");
}

/// AWAITING_NAME: prompts until a valid, unclaimed username arrives.
///
/// Returns `None` when the peer disconnects first; nothing was registered
/// in that case, so the caller skips straight to teardown.
async fn negotiate_username<R>(
    id: SessionId,
    lines: &mut Lines<BufReader<R>>,
    tx: &mpsc::UnboundedSender<String>,
    registry: &SharedRegistry,
) -> Option<SessionHandle>
where
    R: AsyncRead + Unpin,
{
    loop {
        if tx.send(ENTER_USERNAME.to_string()).is_err() {
            return None;
        }
        let candidate = match lines.next_line().await {
            Ok(Some(candidate)) => candidate,
            // Disconnect during negotiation: no registry mutation needed.
            Ok(None) | Err(_) => return None,
        };

        if candidate.trim().is_empty() || candidate.contains(' ') {
            debug!("session {id}: rejected malformed candidate {candidate:?}");
            continue;
        }

        // Check-then-insert happens inside one write lock, so sessions
        // racing on the same candidate cannot both succeed.
        let handle = SessionHandle::new(id, candidate, tx.clone());
        if registry.write().await.try_register(handle.clone()) {
            return Some(handle);
        }
        debug!("session {id}: username {:?} already taken", handle.username);
    }
}

/// ACTIVE: reads lines until EOF, a read failure, or an explicit logout.
async fn active_loop<R>(
    lines: &mut Lines<BufReader<R>>,
    router: &CommandRouter,
    handle: &SessionHandle,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // EOF and read failures are implicit logouts.
            Ok(None) => break,
            Err(e) => {
                debug!("{}: read failed: {e}", handle.username);
                break;
            }
        };

        match Command::parse(&line) {
            Ok(Some(command)) => {
                if router.dispatch(handle, command).await == Flow::Logout {
                    break;
                }
            }
            Ok(None) => {} // blank input
            Err(e) => router.report(handle, e),
        }
    }
}

/// Queues `line` on every active session except the sender's own.
async fn deliver_to_peers(registry: &SharedRegistry, sender: &SessionHandle, line: String) {
    let peers = registry.read().await.peers_of(sender.id);
    for peer in peers {
        peer.send(line.clone());
    }
}

/// Writer task: drains the session's outbound queue to the socket.
///
/// One writer per session serializes delivery, preserving per-recipient
/// message order. Write failures end the task; the read side observes the
/// dead connection on its own.
fn spawn_writer<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> JoinHandle<()>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    })
}
