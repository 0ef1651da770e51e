//! Backplane core: PostgreSQL catalog introspection, generic record CRUD,
//! and column DDL for the schema-canvas web tool.
//!
//! The web layer (routing, sessions, rendering) lives elsewhere; it hands
//! this crate a validated connection descriptor and gets back a typed
//! [`schema::SchemaGraph`], record rows, or a classified error.

pub mod classify;
pub mod connect;
pub mod ddl;
pub mod error;
pub mod ident;
pub mod introspect;
pub mod records;
pub mod schema;
#[cfg(test)]
mod testutil;

pub use error::BackplaneError;
pub use schema::SchemaGraph;
