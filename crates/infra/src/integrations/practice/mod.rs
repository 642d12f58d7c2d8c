//! Legacy practice-management integration
//!
//! Read-only client for the legacy billing API. The payload shape is
//! duck-typed and versioned loosely, so the client deserializes into the raw
//! record types and leaves normalization to the core.

mod client;

pub use client::{AccessTokenProvider, PracticeClient, StaticTokenProvider};
