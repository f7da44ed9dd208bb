//! API module - authenticated calls to the agents backend

pub mod client;

pub use client::{ApiClient, ApiRequest};
