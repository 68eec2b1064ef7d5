//! Source clients for subscope.
//!
//! This crate provides the transport capability, the deduplicated and retried
//! request plumbing, the PsychonautWiki and TripSit clients, and the combined
//! lookup used by the server.

pub mod de;
pub mod gateway;
pub mod lookup;
pub mod psychonaut;
pub mod resolve;
pub mod transport;
pub mod tripsit;

pub use gateway::{ApiGateway, PSYCHONAUT_ENDPOINT};
pub use lookup::{SourceResults, SubstanceLookup};
pub use psychonaut::PsychonautClient;
pub use resolve::LookupResults;
pub use transport::{HttpConfig, HttpTransport, Method, Transport, TransportRequest, TransportResponse};
#[cfg(any(test, feature = "test-util"))]
pub use transport::ScriptedTransport;
pub use tripsit::{DirectoryEntry, TripSitClient, TripSitEndpoints};
