//! Core module - shared infrastructure for foundry-chat
//!
//! Configuration, the error taxonomy, and the data types every other module
//! passes around.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ChatError, Result};
pub use types::*;
