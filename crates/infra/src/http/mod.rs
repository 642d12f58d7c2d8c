//! HTTP plumbing shared by the outbound API clients

mod client;

pub use client::{HttpClient, HttpClientBuilder};
