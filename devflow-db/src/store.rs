//! MongoDB binding for the connection layer.
//!
//! The driver connects lazily, so establishing a session ends with a `ping`
//! against the default database - only a handle that answered the ping is
//! ever cached.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ServerAddress};
use mongodb::Client;

use crate::connector::EstablishConnection;
use crate::error::{DbError, Result};

/// How long an operation may wait for a reachable server before failing.
/// Kept short so operations issued while disconnected fail fast instead of
/// queueing.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Database name when the URI carries no default database.
const DEFAULT_DATABASE: &str = "test";

const DEFAULT_PORT: u16 = 27017;

/// Reported connectivity status of a store session, in the store's own
/// numeric order (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Disconnected,
    Connected,
    Connecting,
    Disconnecting,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnecting => "disconnecting",
        };
        f.write_str(state)
    }
}

/// A live session bound to the document store.
///
/// Implemented by [`MongoHandle`] in production and by test doubles in the
/// connection lifecycle tests.
pub trait StoreHandle: Clone + Send + Sync + 'static {
    fn ready_state(&self) -> ReadyState;
    fn database(&self) -> &str;
    fn host(&self) -> &str;
    fn port(&self) -> u16;
}

/// An established MongoDB session. Cloning shares the same underlying
/// driver client, so every caller holds the same session.
#[derive(Clone)]
pub struct MongoHandle {
    client: Client,
    database: String,
    host: String,
    port: u16,
    ready: ReadyState,
}

impl MongoHandle {
    /// The underlying driver client, for collection access.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl StoreHandle for MongoHandle {
    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }
}

/// Opens sessions to MongoDB.
pub struct MongoStore {
    app_name: String,
}

impl MongoStore {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

/// Database name and first server address out of parsed client options.
fn store_identity(options: &ClientOptions) -> (String, String, u16) {
    let database = options
        .default_database
        .clone()
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
    let (host, port) = match options.hosts.first() {
        Some(ServerAddress::Tcp { host, port }) => (host.clone(), (*port).unwrap_or(DEFAULT_PORT)),
        Some(other) => (other.to_string(), DEFAULT_PORT),
        None => ("localhost".to_string(), DEFAULT_PORT),
    };
    (database, host, port)
}

#[async_trait]
impl EstablishConnection for MongoStore {
    type Handle = MongoHandle;

    async fn establish(&self, uri: &str) -> Result<MongoHandle> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|err| DbError::connection(format!("invalid connection string: {err}")))?;
        options.app_name = Some(self.app_name.clone());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let (database, host, port) = store_identity(&options);

        let client = Client::with_options(options)
            .map_err(|err| DbError::connection(err.to_string()))?;

        client
            .database(&database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| DbError::connection(err.to_string()))?;

        Ok(MongoHandle {
            client,
            database,
            host,
            port,
            ready: ReadyState::Connected,
        })
    }
}
