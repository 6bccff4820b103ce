//! Utility functions shared by the terminal host and the forum adapter.
//!
//! - **Text**: display-width aware truncation and control-character stripping
//!   for names supplied by the forum
//! - **Base URL**: validation of the configured forum address

mod base_url;
mod text;

pub use base_url::{validate_base_url, BaseUrlError};
pub use text::{display_width, strip_control_chars, truncate_to_width};
