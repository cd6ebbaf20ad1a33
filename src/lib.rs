//! Offline Forms - Main Library
//!
//! Offline-first submission core for a contact form. Submissions are posted
//! to a remote API when the device is online, and queued in a local SQLite
//! database when it is not, to be resent later.
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Submission payload and queue record
//!   - Payload error types
//!   - Configuration (builder and TOML loading)
//!
//! - **`client`** - The offline queue itself
//!   - Durable queue store with an observable pending set
//!   - Connectivity observer fed by environment events
//!   - HTTP submission gateway
//!   - Sync coordinator and optional reconnect worker
//!
//! - **`logging`** - `tracing-subscriber` setup
//!
//! # Usage
//!
//! ```rust,no_run
//! use offline_forms::client::{Config, OfflineClient};
//! use offline_forms::shared::{Category, SubmissionFields};
//!
//! # async fn example() -> Result<(), offline_forms::client::OfflineError> {
//! let config = Config::new();
//! offline_forms::logging::init_tracing(config.log_filter());
//!
//! let client = OfflineClient::start(&config, false).await?;
//! let fields = SubmissionFields::new("Ana", "García", "ana@example.com", Category::General);
//! client.coordinator().submit(fields).await?;
//!
//! // later, once the environment reports connectivity
//! client.network().set_online(true);
//! client.coordinator().resync_all().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The store, observer and coordinator are `Send + Sync` and meant to be
//! shared through `Arc`. Store mutations are serialized internally.
//!
//! # Error Handling
//!
//! - `client::OfflineError` for storage, gateway and connectivity failures
//! - `shared::SharedError` for payload validation and serialization
//! - `shared::ConfigError` for configuration problems

/// Shared types and data structures
pub mod shared;

/// Offline queue, connectivity and sync
pub mod client;

/// Tracing subscriber setup
pub mod logging;
