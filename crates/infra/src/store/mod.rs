//! Relational-store adapters
//!
//! REST client for the hosted table API plus the repositories built on it:
//! sales rows and the customer directory.

mod client;
mod customers;
mod sales;

pub use client::{FilterOp, QueryFilter, StoreClient};
pub use customers::CustomerStore;
pub use sales::SalesRecordStore;
