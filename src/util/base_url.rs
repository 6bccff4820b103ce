use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum BaseUrlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Plain HTTP is only allowed for localhost")]
    InsecureScheme,
    #[error("Credentials must not be embedded in the URL")]
    EmbeddedCredentials,
}

/// Validate the forum's base URL and normalise it for joining.
///
/// The API key travels in headers, so plain `http` is refused except for a
/// loopback host. The returned URL has no query or fragment and its path ends
/// in `/`, so relative endpoint paths join beneath it (sub-folder installs
/// such as `https://example.com/forum` keep their prefix).
pub fn validate_base_url(raw: &str) -> Result<Url, BaseUrlError> {
    let mut url = Url::parse(raw.trim())?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(&url) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS forum URL (localhost only)");
        }
        "http" => return Err(BaseUrlError::InsecureScheme),
        scheme => return Err(BaseUrlError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(BaseUrlError::EmbeddedCredentials);
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}
