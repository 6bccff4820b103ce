//! Discourse HTTP adapter.
//!
//! Implements [`crate::ports::ContextProvider`] and
//! [`crate::ports::SubscriptionTransport`] against a forum's JSON API.

mod client;
mod topic_url;
mod types;

pub use client::{Credentials, DiscourseClient};
pub use topic_url::topic_id_from_url;
