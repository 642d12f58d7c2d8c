//! External system integrations

pub mod practice;
