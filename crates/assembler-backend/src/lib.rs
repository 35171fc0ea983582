//! # assembler-backend
//!
//! Helpers the graph-store backend builds its queries and responses from:
//!
//! - [`resolve`]: find the ID of the most specific entity a materialized node
//!   carries (package version over name over namespace, and so on)
//! - [`predicate`]: optional, composable `WHERE` conditions rendered for rusqlite
//! - [`batch`]: fixed-size chunking under store statement limits
//! - [`config`]: batch size and ID scheme, loaded from RON
//!
//! Everything here is pure. Connections, transactions and retries belong to
//! the caller.

pub mod batch;
pub mod config;
pub mod error;
pub mod predicate;
pub mod resolve;

pub use batch::{chunk, into_chunks};
pub use config::BackendConfig;
pub use error::{BackendError, ConfigError, ResolveError};
pub use predicate::{
    Predicate, Selector, SqlFragment, id_eq, id_in, optional_predicate, to_lower_opt,
};
pub use resolve::{ResolvedId, resolve, resolve_global_id, resolve_id};
