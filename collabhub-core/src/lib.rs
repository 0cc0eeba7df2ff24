//! # CollabHub Core Library
//!
//! This crate contains the domain core of CollabHub: data models, capability
//! resolution, mention parsing, event fanout, and the notification inbox.
//! The API server is a thin HTTP surface over the operations defined here.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `access`: Capability resolution and actor extraction
//! - `mentions`: `@mention` parsing
//! - `fanout`: Domain events and the engine that reacts to them
//! - `ops`: Permission-gated operations tying the above together
//! - `db`: Connection pool and migrations
//! - `error`: Core error taxonomy

pub mod access;
pub mod db;
pub mod error;
pub mod fanout;
pub mod mentions;
pub mod models;
pub mod ops;

/// Current version of the CollabHub core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
