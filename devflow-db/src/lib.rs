//! Document-store connection layer for devflow.
//!
//! The backing store is reached through exactly one cached session per
//! process. [`Connector::get`] returns the cached handle when one exists,
//! joins an in-flight connection attempt when one is underway, and otherwise
//! opens a new session - so any number of concurrent callers trigger at most
//! one handshake ("single-flight").
//!
//! # Design Principles
//!
//! - One handle, one attempt: never a pool, never two racing handshakes
//! - Failed attempts are cleared, not cached - the next caller retries
//! - The handshake is a trait seam so tests run without a live store

pub mod cache;
pub mod config;
pub mod connector;
pub mod error;
pub mod health;
pub mod store;

pub use cache::{Attempt, CacheLookup, ConnectionCache};
pub use config::DbConfig;
pub use connector::{Connector, EstablishConnection};
pub use error::{DbError, Result};
pub use health::{test_connection, StoreDetails, TestOutcome};
pub use store::{MongoHandle, MongoStore, ReadyState, StoreHandle};
