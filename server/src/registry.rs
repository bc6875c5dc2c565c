//! Session registry and username index for the chat server.
//!
//! This module owns the process-wide view of who is connected:
//! - Session lifecycle (register on accepted username, deregister on leave)
//! - The authoritative username → session index used by negotiation
//! - Handle lookup for private messages and broadcast fan-out
//!
//! The registry lives behind a single `Arc<RwLock<_>>`. Every mutation
//! happens under the write lock, so the check-then-insert during username
//! negotiation is atomic across concurrently negotiating sessions and
//! broadcast iteration never observes a half-registered session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::info;
use tokio::sync::{mpsc, RwLock};

/// Identifies one accepted connection for the lifetime of the process.
pub type SessionId = u32;

/// Shared, thread-safe registry handle.
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Handle through which any task delivers lines to a session.
///
/// Delivery is always "the session is told to send": lines are queued on
/// the session's outbound channel and written to the socket by that
/// session's own writer task, which keeps per-recipient order intact. No
/// task ever writes to another session's socket directly.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Unique session identifier assigned by the accept loop.
    pub id: SessionId,
    /// Negotiated username; set once, never reused while the session lives.
    pub username: String,
    /// When the connection was accepted.
    pub connected_since: DateTime<Local>,
    tx: mpsc::UnboundedSender<String>,
}

impl SessionHandle {
    pub fn new(id: SessionId, username: String, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            username,
            connected_since: Local::now(),
            tx,
        }
    }

    /// Queues one line for delivery. A closed channel means the session
    /// is already tearing down; the line is dropped, matching best-effort
    /// delivery to currently-connected peers.
    pub fn send(&self, line: String) {
        let _ = self.tx.send(line);
    }
}

/// Registry of active sessions and the authoritative username index.
///
/// `by_name` is the authority for "is this name taken". Both maps are
/// only ever mutated together, so a session is never visible in one map
/// without the other.
#[derive(Debug, Default)]
pub struct Registry {
    /// Active sessions indexed by their unique ID.
    sessions: HashMap<SessionId, SessionHandle>,
    /// Username index; keys are unique across live sessions.
    by_name: HashMap<String, SessionId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh registry in the shared handle passed across tasks.
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Registers a session under its username.
    ///
    /// Refuses the handle when the name is already taken. The caller
    /// holds the write lock for the whole call, which makes the
    /// check-then-insert atomic: two sessions racing on the same
    /// candidate cannot both succeed.
    pub fn try_register(&mut self, handle: SessionHandle) -> bool {
        if self.by_name.contains_key(&handle.username) {
            return false;
        }
        info!("session {} registered as {:?}", handle.id, handle.username);
        self.by_name.insert(handle.username.clone(), handle.id);
        self.sessions.insert(handle.id, handle);
        true
    }

    /// Removes a session from both maps.
    ///
    /// Idempotent: removing an unknown id is a no-op returning `None`.
    /// Returns the removed handle so the caller can broadcast the
    /// departure with the captured username, which is free for reuse the
    /// moment this returns.
    pub fn deregister(&mut self, id: SessionId) -> Option<SessionHandle> {
        let handle = self.sessions.remove(&id)?;
        self.by_name.remove(&handle.username);
        info!("session {} ({:?}) deregistered", handle.id, handle.username);
        Some(handle)
    }

    /// True when the username is held by a live session.
    pub fn is_taken(&self, username: &str) -> bool {
        self.by_name.contains_key(username)
    }

    /// The session currently registered under `username`, if any.
    pub fn lookup(&self, username: &str) -> Option<&SessionHandle> {
        self.by_name
            .get(username)
            .and_then(|id| self.sessions.get(id))
    }

    /// Handles of every session except `id`, for broadcast fan-out.
    pub fn peers_of(&self, id: SessionId) -> Vec<SessionHandle> {
        self.sessions
            .values()
            .filter(|handle| handle.id != id)
            .cloned()
            .collect()
    }

    /// Username and connect time of every active session, requester
    /// included.
    pub fn roster(&self) -> Vec<(String, DateTime<Local>)> {
        self.sessions
            .values()
            .map(|handle| (handle.username.clone(), handle.connected_since))
            .collect()
    }

    /// Number of currently registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: SessionId, username: &str) -> (SessionHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SessionHandle::new(id, username.to_string(), tx), rx)
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = Registry::new();
        let (alice, _rx) = handle(1, "alice");

        assert!(registry.try_register(alice));
        assert!(registry.is_taken("alice"));
        assert_eq!(registry.lookup("alice").map(|h| h.id), Some(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_name_is_refused() {
        let mut registry = Registry::new();
        let (first, _rx1) = handle(1, "alice");
        let (second, _rx2) = handle(2, "alice");

        assert!(registry.try_register(first));
        assert!(!registry.try_register(second));

        // The original holder is untouched.
        assert_eq!(registry.lookup("alice").map(|h| h.id), Some(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deregister_is_idempotent() {
        let mut registry = Registry::new();
        let (alice, _rx) = handle(1, "alice");
        registry.try_register(alice);

        let removed = registry.deregister(1);
        assert_eq!(removed.map(|h| h.username), Some("alice".to_string()));

        assert!(registry.deregister(1).is_none());
        assert!(registry.deregister(99).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn name_is_reusable_after_deregister() {
        let mut registry = Registry::new();
        let (first, _rx1) = handle(1, "alice");
        registry.try_register(first);
        registry.deregister(1);

        let (second, _rx2) = handle(2, "alice");
        assert!(registry.try_register(second));
        assert_eq!(registry.lookup("alice").map(|h| h.id), Some(2));
    }

    #[test]
    fn maps_stay_consistent() {
        let mut registry = Registry::new();
        let (alice, _rx1) = handle(1, "alice");
        let (bob, _rx2) = handle(2, "bob");
        registry.try_register(alice);
        registry.try_register(bob);

        registry.deregister(1);

        // Removed from both maps, the survivor visible in both.
        assert!(!registry.is_taken("alice"));
        assert!(registry.lookup("alice").is_none());
        assert!(registry.is_taken("bob"));
        assert_eq!(registry.lookup("bob").map(|h| h.id), Some(2));
    }

    #[test]
    fn peers_exclude_the_session_itself() {
        let mut registry = Registry::new();
        let (alice, _rx1) = handle(1, "alice");
        let (bob, _rx2) = handle(2, "bob");
        let (carol, _rx3) = handle(3, "carol");
        registry.try_register(alice);
        registry.try_register(bob);
        registry.try_register(carol);

        let peers = registry.peers_of(1);
        assert_eq!(peers.len(), 2);
        assert!(peers.iter().all(|h| h.id != 1));
    }

    #[test]
    fn roster_includes_every_session() {
        let mut registry = Registry::new();
        let (alice, _rx1) = handle(1, "alice");
        let (bob, _rx2) = handle(2, "bob");
        registry.try_register(alice);
        registry.try_register(bob);

        let mut names: Vec<String> = registry.roster().into_iter().map(|(n, _)| n).collect();
        names.sort();
        assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn send_to_departed_session_is_dropped() {
        let (alice, rx) = handle(1, "alice");
        drop(rx);
        // Must not panic; delivery is best-effort.
        alice.send("hello".to_string());
    }
}
