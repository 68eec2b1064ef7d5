//! Core types and shared functionality for subscope.
//!
//! This crate provides:
//! - Name normalization for cache and match keys
//! - In-memory expiring cache
//! - Per-endpoint error breaker, retrying fetcher and request deduplication
//! - Normalized substance records
//! - Built-in seed vocabulary
//! - Unified error types
//! - Configuration structures

pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod normalize;
pub mod record;
pub mod retry;
pub mod vocabulary;

pub use breaker::{Breaker, ErrorBreaker};
pub use cache::{CacheStats, ExpiringCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use dedup::RequestDeduplicator;
pub use error::{Error, ParseError};
pub use normalize::{normalize, normalize_opt};
pub use record::{Interaction, Interactions, Source, SourceDetails, SubstanceRecord};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use vocabulary::builtin_names;
