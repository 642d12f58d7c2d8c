//! TallySync infrastructure adapters
//!
//! Concrete implementations of the core ports: the legacy practice-management
//! billing source, the hosted-table sales/customer stores, the session-scoped
//! staging backend, and the configuration loader.

pub mod config;
pub mod http;
pub mod integrations;
pub mod staging;
pub mod store;

pub use http::HttpClient;
pub use integrations::practice::{AccessTokenProvider, PracticeClient, StaticTokenProvider};
pub use staging::MemorySessionStore;
pub use store::{CustomerStore, SalesRecordStore, StoreClient};
