//! TCP accept loop and server lifecycle.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use shared::{ConfigError, MAX_SESSIONS};

use crate::facts::FactProvider;
use crate::registry::{Registry, SessionId, SharedRegistry};
use crate::session;

/// Fatal server errors. Both abort startup before any session exists;
/// nothing that happens inside a session ever surfaces here.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind listening socket: {0}")]
    Bind(#[source] io::Error),
}

/// Accepts connections and spawns one session task per client.
pub struct ChatServer {
    listener: TcpListener,
    registry: SharedRegistry,
    facts: Arc<FactProvider>,
    permits: Arc<Semaphore>,
}

impl ChatServer {
    /// Binds the listening socket with the default session capacity.
    /// An unavailable port is fatal.
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        Self::bind_with_capacity(addr, MAX_SESSIONS).await
    }

    /// Binds with an explicit live-session capacity. Tests use small
    /// capacities to exercise the cap without opening [`MAX_SESSIONS`]
    /// sockets.
    pub async fn bind_with_capacity(addr: &str, capacity: usize) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
        if let Ok(local) = listener.local_addr() {
            info!("Server started, listening on {local}");
        }
        Ok(Self {
            listener,
            registry: Registry::shared(),
            facts: Arc::new(FactProvider::default()),
            permits: Arc::new(Semaphore::new(capacity)),
        })
    }

    /// The address actually bound; lets tests bind port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared registry handle, exposed so tests can observe session state.
    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Accept loop.
    ///
    /// A semaphore permit is held for each live session, capping the
    /// server at its configured capacity; accepting resumes as soon as
    /// a session ends and releases its permit. The loop never blocks on
    /// session completion.
    pub async fn run(self) -> Result<(), ServerError> {
        let mut next_id: SessionId = 1;
        loop {
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                break;
            };
            let (socket, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            let id = next_id;
            next_id = next_id.wrapping_add(1);
            info!("Instance started | {addr} | session {id}");

            let registry = Arc::clone(&self.registry);
            let facts = Arc::clone(&self.facts);
            tokio::spawn(async move {
                session::run(id, socket, registry, facts).await;
                drop(permit);
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_to_ephemeral_port() {
        let server = ChatServer::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert!(server.registry().read().await.is_empty());
    }

    #[tokio::test]
    async fn bind_conflict_is_a_bind_error() {
        let first = ChatServer::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().unwrap();

        let second = ChatServer::bind(&addr.to_string()).await;
        assert!(matches!(second, Err(ServerError::Bind(_))));
    }
}
