//! # CollabHub API Server Library
//!
//! This library provides the HTTP surface of CollabHub: a thin Axum server
//! that maps REST routes onto the operations in `collabhub-core`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
