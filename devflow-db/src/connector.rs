//! The connector: the one road from the application to a usable store
//! connection.
//!
//! Every caller goes through [`Connector::get`]. A cached handle is returned
//! directly; an in-flight attempt is joined; only an empty cache starts a new
//! handshake. On failure the attempt marker is cleared and the error is
//! propagated - the next external call retries, nothing retries on a timer.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::cache::{CacheLookup, ConnectionCache};
use crate::config::DbConfig;
use crate::error::Result;

/// The handshake seam: opens a brand-new session to the store.
///
/// Production uses [`MongoStore`](crate::store::MongoStore); tests substitute
/// an implementation that counts handshakes and injects failures.
#[async_trait]
pub trait EstablishConnection: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn establish(&self, uri: &str) -> Result<Self::Handle>;
}

#[async_trait]
impl<E: EstablishConnection> EstablishConnection for Arc<E> {
    type Handle = E::Handle;

    async fn establish(&self, uri: &str) -> Result<Self::Handle> {
        (**self).establish(uri).await
    }
}

/// Hands out the process-wide store connection.
pub struct Connector<E: EstablishConnection> {
    config: DbConfig,
    establish: Arc<E>,
    cache: ConnectionCache<E::Handle>,
}

impl<E: EstablishConnection> Connector<E> {
    pub fn new(config: DbConfig, establish: E) -> Self {
        Self {
            config,
            establish: Arc::new(establish),
            cache: ConnectionCache::new(),
        }
    }

    /// Cache state, for callers that observe without connecting.
    pub fn cache(&self) -> &ConnectionCache<E::Handle> {
        &self.cache
    }

    /// Get a usable connection to the store.
    ///
    /// Returns the cached handle when one exists (no I/O), joins the
    /// in-flight attempt when one is underway, and otherwise opens a new
    /// session. All callers that joined the same attempt see the same
    /// outcome.
    ///
    /// # Errors
    ///
    /// [`DbError::Configuration`](crate::DbError::Configuration) when no
    /// connection string is configured (fatal, no handshake is issued);
    /// [`DbError::Connection`](crate::DbError::Connection) when the store is
    /// unreachable or rejects the handshake (retryable on the next call).
    pub async fn get(&self) -> Result<E::Handle> {
        let uri = self.config.uri()?.to_string();

        let (id, attempt, started) = match self.cache.get_or_publish(|| {
            let establish = Arc::clone(&self.establish);
            let uri = uri.clone();
            async move { establish.establish(&uri).await }.boxed()
        }) {
            CacheLookup::Ready(handle) => {
                debug!("using existing database connection");
                return Ok(handle);
            }
            CacheLookup::Joined { id, attempt } => (id, attempt, false),
            CacheLookup::Started { id, attempt } => (id, attempt, true),
        };

        if started {
            info!(uri = %uri, "attempting to connect to document store");
        } else {
            debug!("joining in-flight connection attempt");
        }

        match attempt.await {
            Ok(handle) => {
                self.cache.set_handle(handle.clone());
                if started {
                    info!("database connection established");
                }
                Ok(handle)
            }
            Err(err) => {
                // Clear so the next call retries; the id keeps a slow joiner
                // from tearing down a successor attempt.
                self.cache.clear_attempt(id);
                error!(error = %err, "failed to connect to document store");
                Err(err)
            }
        }
    }
}
