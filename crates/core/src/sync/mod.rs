//! Reconciliation engine: normalize, compare, stage, apply.

pub mod comparator;
pub mod normalizer;
pub mod ports;
pub mod service;
pub mod staging;

pub use service::SyncService;
