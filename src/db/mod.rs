//! Database module: engine selection, schema and generic entity storage.
//!
//! Layout:
//! - `backend.rs`: engine tag parsing and the connect/disconnect lifecycle
//! - `embedded.rs` / `network.rs`: SQLite file and MySQL/PostgreSQL bindings
//! - `dialect.rs` / `schema.rs`: SQL differences and declarative table DDL
//! - `entity.rs` / `store.rs`: the entity contract and its CRUD implementation
//! - `models.rs`: movies and schedules

pub mod backend;
pub mod dialect;
pub mod embedded;
pub mod entity;
pub mod handle;
pub mod models;
pub mod network;
pub mod schema;
pub mod store;

pub use backend::{Backend, BackendKind, select};
pub use dialect::Dialect;
pub use entity::{Entity, SqlValue};
pub use handle::Db;
pub use models::{Movie, Schedule};
pub use store::{Store, page_count, page_offset};
