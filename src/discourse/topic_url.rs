use url::Url;

/// Extract the topic id from a topic page URL.
///
/// `raw` may be absolute or relative to `base`. Recognised paths, relative to
/// the base path:
///
/// - `t/<slug>/<id>`, optionally followed by a post number
/// - `t/<id>`
///
/// Anything else, including URLs on another host, is not a topic page.
pub fn topic_id_from_url(base: &Url, raw: &str) -> Option<i64> {
    let url = base.join(raw.trim()).ok()?;
    if url.origin() != base.origin() {
        return None;
    }

    let relative = url.path().strip_prefix(base.path())?;
    let segments: Vec<&str> = relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let (first, rest) = segments.split_first()?;
    if *first != "t" {
        return None;
    }

    match rest {
        [id] => parse_id(id),
        [_slug, id, ..] => parse_id(id),
        [] => None,
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    let segment = segment.strip_suffix(".json").unwrap_or(segment);
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://forum.example.com/").unwrap()
    }

    #[test]
    fn test_slug_and_id() {
        assert_eq!(topic_id_from_url(&base(), "/t/welcome-to-news/42"), Some(42));
        assert_eq!(topic_id_from_url(&base(), "/t/welcome-to-news/42/7"), Some(42));
        assert_eq!(
            topic_id_from_url(&base(), "https://forum.example.com/t/welcome/42?u=bob"),
            Some(42)
        );
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(topic_id_from_url(&base(), "/t/42"), Some(42));
        assert_eq!(topic_id_from_url(&base(), "t/42"), Some(42));
    }

    #[test]
    fn test_non_topic_pages() {
        assert_eq!(topic_id_from_url(&base(), "/latest"), None);
        assert_eq!(topic_id_from_url(&base(), "/c/news/161"), None);
        assert_eq!(topic_id_from_url(&base(), "/t/"), None);
        assert_eq!(topic_id_from_url(&base(), "/t/slug-only"), None);
        assert_eq!(topic_id_from_url(&base(), "/t/slug/-3"), None);
    }

    #[test]
    fn test_other_host_is_not_a_topic() {
        assert_eq!(
            topic_id_from_url(&base(), "https://evil.example.net/t/welcome/42"),
            None
        );
    }

    #[test]
    fn test_subfolder_install() {
        let base = Url::parse("https://example.com/forum/").unwrap();
        assert_eq!(topic_id_from_url(&base, "/forum/t/hello/9"), Some(9));
        assert_eq!(topic_id_from_url(&base, "t/hello/9"), Some(9));
        assert_eq!(topic_id_from_url(&base, "/t/hello/9"), None);
    }
}
