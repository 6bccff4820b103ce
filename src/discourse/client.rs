use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::topic_url::topic_id_from_url;
use super::types::{SessionResponse, SiteResponse, TopicDto};
use crate::ports::{ContextProvider, RemoteError, SubscriptionTransport};
use crate::program::Category;
use crate::session::{CurrentUser, NotificationLevel, TopicRecord};
use crate::util::{validate_base_url, BaseUrlError};

const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_RETRIES: u32 = 3;

/// API user credentials sent as `Api-Username` / `Api-Key` headers.
pub struct Credentials {
    pub username: String,
    pub api_key: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// JSON API client for one forum.
///
/// Reads retry transient failures with exponential backoff (1s, 2s, 4s).
/// Notification changes are sent once; the user retries from the banner.
#[derive(Debug)]
pub struct DiscourseClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<Credentials>,
    retry_delay: Duration,
}

fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        // Credentials stay on the forum's own origin.
        let same_origin = attempt
            .previous()
            .first()
            .is_some_and(|first| first.origin() == attempt.url().origin());
        if !same_origin {
            return attempt.stop();
        }
        tracing::debug!(to = %attempt.url(), hop = attempt.previous().len(), "Following redirect");
        attempt.follow()
    })
}

impl DiscourseClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, RemoteError> {
        let base = validate_base_url(base_url).map_err(|e| match e {
            BaseUrlError::InsecureScheme => {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS forum URL");
                RemoteError::InsecureBaseUrl
            }
            other => {
                tracing::error!(base_url = %base_url, error = %other, "Invalid forum URL");
                RemoteError::InvalidUrl
            }
        })?;

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("category-banner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            credentials,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Override the first retry delay (doubles on each attempt).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base.join(path).map_err(|_| RemoteError::InvalidUrl)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => request
                .header("Api-Username", &credentials.username)
                .header("Api-Key", credentials.api_key.expose_secret()),
            None => request,
        }
    }

    /// GET a JSON document. A 404 is `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RemoteError> {
        let url = self.endpoint(path)?;
        let mut retry_count = 0;

        loop {
            match self.get_once(&url).await {
                Ok(Some(body)) => return Ok(Some(serde_json::from_slice(&body)?)),
                Ok(None) => return Ok(None),
                Err(e) if e.is_retryable() && retry_count < MAX_RETRIES => {
                    let delay = self.retry_delay * (1u32 << retry_count);
                    tracing::debug!(
                        error = %e,
                        path,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying forum request after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<Option<Vec<u8>>, RemoteError> {
        let request = self
            .authorize(self.http.get(url.clone()))
            .header("Accept", "application/json");
        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| RemoteError::Timeout)??;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status().as_u16()));
        }
        read_limited_bytes(response, MAX_RESPONSE_SIZE).await.map(Some)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, RemoteError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[async_trait]
impl ContextProvider for DiscourseClient {
    async fn current_user(&self) -> Result<Option<CurrentUser>, RemoteError> {
        if self.credentials.is_none() {
            tracing::info!("No API credentials configured, browsing anonymously");
            return Ok(None);
        }
        let session: Option<SessionResponse> = self.get_json("session/current.json").await?;
        Ok(session.map(|s| s.current_user.into()))
    }

    async fn site_categories(&self) -> Result<Vec<Category>, RemoteError> {
        let site: Option<SiteResponse> = self.get_json("site.json").await?;
        let site = site.ok_or(RemoteError::HttpStatus(404))?;
        Ok(site.categories.into_iter().map(Into::into).collect())
    }

    async fn topic_at(&self, url: &str) -> Result<Option<TopicRecord>, RemoteError> {
        let Some(id) = topic_id_from_url(&self.base, url) else {
            tracing::debug!(url, "Not a topic page");
            return Ok(None);
        };
        let topic: Option<TopicDto> = self.get_json(&format!("t/{}.json", id)).await?;
        if topic.is_none() {
            tracing::debug!(topic_id = id, "Topic not found");
        }
        Ok(topic.map(Into::into))
    }
}

#[async_trait]
impl SubscriptionTransport for DiscourseClient {
    async fn set_notification_level(
        &self,
        category_id: i64,
        level: NotificationLevel,
    ) -> Result<(), RemoteError> {
        if self.credentials.is_none() {
            return Err(RemoteError::MissingCredentials);
        }
        let url = self.endpoint(&format!("category/{}/notifications", category_id))?;
        let request = self
            .authorize(self.http.post(url))
            .form(&[("notification_level", level.as_i32())]);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| RemoteError::Timeout)??;
        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status().as_u16()));
        }
        tracing::debug!(category_id, level = level.as_i32(), "Notification level request accepted");
        Ok(())
    }
}
