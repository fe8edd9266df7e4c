//! Read-only connection test used by the CLI harness.
//!
//! Calls the connector, then checks that the handle reports `connected`.
//! Failures come back as a structured outcome rather than an error, so the
//! harness can report them uniformly.

use serde::Serialize;
use tracing::{error, info};

use crate::connector::{Connector, EstablishConnection};
use crate::store::{ReadyState, StoreHandle};

/// Identity of the store a successful test reached.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoreDetails {
    pub database: String,
    pub host: String,
    pub port: u16,
}

/// Structured result of a connection test.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<StoreDetails>,
}

impl TestOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }
}

/// Test connectivity to the document store.
///
/// A handle must report exactly [`ReadyState::Connected`] to count as a
/// success; any other state is a structured failure, not a panic. The cache
/// is not mutated beyond what [`Connector::get`] itself does.
pub async fn test_connection<E>(connector: &Connector<E>) -> TestOutcome
where
    E: EstablishConnection,
    E::Handle: StoreHandle,
{
    let handle = match connector.get().await {
        Ok(handle) => handle,
        Err(err) => {
            error!(error = %err, "database connection test failed");
            return TestOutcome::failed(err.to_string());
        }
    };

    let state = handle.ready_state();
    if state != ReadyState::Connected {
        error!(%state, "database connection test failed");
        return TestOutcome::failed(format!("connection state is {state}"));
    }

    info!(
        database = handle.database(),
        host = handle.host(),
        port = handle.port(),
        "database connection test successful"
    );
    TestOutcome {
        success: true,
        message: "database connection successful".to_string(),
        details: Some(StoreDetails {
            database: handle.database().to_string(),
            host: handle.host().to_string(),
            port: handle.port(),
        }),
    }
}
