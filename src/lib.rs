//! Kanvax Task Service Library
//!
//! This module exports the core components for testing and integration.

pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod types;
