// agrifleet-api: Async Rust client for the AgriFleet dashboard backend.

pub mod client;
pub mod error;
pub mod token;
pub mod transport;

pub use client::{ApiClient, Page, SessionState};
pub use error::Error;
pub use token::{InMemoryTokenStore, TokenStore};
pub use transport::{TlsMode, TransportConfig};
