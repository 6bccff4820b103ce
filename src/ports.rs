//! Collaborators the banner talks to but does not own: the source of the
//! current user/topic and the transport that changes notification levels.
use async_trait::async_trait;
use thiserror::Error;

use crate::program::Category;
use crate::session::{CurrentUser, NotificationLevel, TopicRecord};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    #[error("API credentials are required for this request")]
    MissingCredentials,
    #[error("Background task aborted: {0}")]
    Aborted(String),
}

impl RemoteError {
    /// Returns true if this error is transient and a read may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Timeout | RemoteError::Network(_) => true,
            RemoteError::HttpStatus(status) => *status == 429 || *status >= 500,
            RemoteError::ResponseTooLarge(_)
            | RemoteError::Decode(_)
            | RemoteError::InvalidUrl
            | RemoteError::InsecureBaseUrl
            | RemoteError::MissingCredentials
            | RemoteError::Aborted(_) => false,
        }
    }
}

/// Supplies the context of a page view.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// The signed-in user, or `None` for anonymous sessions.
    async fn current_user(&self) -> Result<Option<CurrentUser>, RemoteError>;

    /// Every category of the site. Read once per session.
    async fn site_categories(&self) -> Result<Vec<Category>, RemoteError>;

    /// The topic shown at `url`, or `None` when `url` is not a topic page or
    /// the topic does not exist.
    async fn topic_at(&self, url: &str) -> Result<Option<TopicRecord>, RemoteError>;
}

/// Changes a user's notification level for a category.
///
/// Setting the same level twice is harmless on the forum side.
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
    async fn set_notification_level(
        &self,
        category_id: i64,
        level: NotificationLevel,
    ) -> Result<(), RemoteError>;
}
