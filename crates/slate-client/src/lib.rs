//! Authenticated HTTP client for the Slate service.
//!
//! This crate provides the client-side half of the service's FNAUTH
//! protocol:
//! - Canonical request signing (HMAC-SHA256 over method, content hash,
//!   timestamp and URL path)
//! - Credential lifecycle with a usability margin and single-flight refresh
//! - A single header-building choke point shared by every domain call
//! - Typed endpoints for shows, sequences, panels, assets and export chains

pub mod client;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod sign;
pub mod types;


pub use client::{ExportScope, SlateClient, SlateConfig};
pub use credentials::CredentialStore;
pub use error::{ClientError, ClientResult};
pub use sign::{sign_request, RequestContent};
pub use types::{AuthResponse, DEFAULT_PANEL_DURATION};
