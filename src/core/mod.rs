//! core
//!
//! Domain-independent building blocks shared by the CLI and the adapters.
//!
//! - [`config`] - Configuration file discovery, schema and defaults

pub mod config;
