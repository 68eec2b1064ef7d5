//! MCP tool implementations.
//!
//! This module contains all tools exposed by the subscope server.

pub mod substance_lookup;
pub mod substance_vocabulary;
