//! Category subscription banner for Discourse forums.
//!
//! Decides, on every topic page view, whether to offer the signed-in user a
//! one-click subscription to the topic's category, and performs it.
//!
//! # Module Structure
//!
//! - `program` - category lists, directory and the pure classifier
//! - `session` - current user and topic records
//! - `banner` - controller state machine, renderer seam and runtime
//! - `ports` - collaborator traits and their error type
//! - `discourse` - HTTP adapter for the forum API
//! - `config` - TOML configuration
//! - `ui` - terminal host
//! - `util` - text and URL helpers

pub mod banner;
pub mod config;
pub mod discourse;
pub mod ports;
pub mod program;
pub mod session;
pub mod ui;
pub mod util;
