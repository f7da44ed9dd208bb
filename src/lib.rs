//! foundry-chat - terminal chat client for backend-configured agents
//!
//! Signs the user in with Microsoft Entra ID, lists the conversational agents
//! the backend exposes, and chats with the selected one.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Auth**: Identity provider seam, Entra ID implementation, session manager
//! - **API**: Bearer-authenticated JSON calls to the backend
//! - **App**: State container, agent directory, and conversation controller
//! - **CLI**: REPL and slash commands
//!
//! # Usage
//!
//! ```rust,no_run
//! use foundry_chat::{App, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let mut app = App::from_config(&config).unwrap();
//!
//!     app.sign_in().await;
//!     app.send_message("Hello").await;
//!
//!     for message in app.state().messages() {
//!         println!("{}: {}", message.role, message.text);
//!     }
//! }
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod core;

// Re-export commonly used items
pub use app::{App, AppState};
pub use cli::Repl;
pub use core::{ChatError, Config, Result};
