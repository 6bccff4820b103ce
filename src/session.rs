//! Host-owned state the banner reads: the signed-in user and the viewed topic.
use std::collections::BTreeSet;

use crate::program::{Category, CategoryDirectory};

/// The per-category notification levels the banner can set.
///
/// The forum also has muted (0), regular (1) and tracking (2); the banner
/// never sets or reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Notified of every post in every topic.
    Watching,
    /// Notified of the first post of every new topic.
    WatchingFirstPost,
}

impl NotificationLevel {
    /// Numeric value sent to the forum API.
    pub const fn as_i32(self) -> i32 {
        match self {
            NotificationLevel::Watching => 3,
            NotificationLevel::WatchingFirstPost => 4,
        }
    }
}

/// The user's existing category subscriptions.
///
/// Append-only from the banner's point of view: [`UserWatchState::record`] is
/// the single update path and it only ever inserts, so concurrent successes
/// merge by set union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserWatchState {
    pub watched_first_post_category_ids: BTreeSet<i64>,
    pub watched_category_ids: BTreeSet<i64>,
}

impl UserWatchState {
    pub fn is_watching_first_post(&self, category_id: i64) -> bool {
        self.watched_first_post_category_ids.contains(&category_id)
    }

    pub fn is_watching(&self, category_id: i64) -> bool {
        self.watched_category_ids.contains(&category_id)
    }

    /// Record a level the forum has accepted. Returns true when the id was new.
    pub fn record(&mut self, category_id: i64, level: NotificationLevel) -> bool {
        match level {
            NotificationLevel::WatchingFirstPost => {
                self.watched_first_post_category_ids.insert(category_id)
            }
            NotificationLevel::Watching => self.watched_category_ids.insert(category_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub watch_state: UserWatchState,
}

/// A topic as returned by the host, before its category is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    pub id: i64,
    pub title: String,
    pub category_id: Option<i64>,
}

/// A topic with its category record attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub category: Option<Category>,
}

impl Topic {
    /// Attach the category record. An id the directory does not know leaves
    /// the topic without a category.
    pub fn resolve<D>(record: TopicRecord, directory: &D) -> Self
    where
        D: CategoryDirectory + ?Sized,
    {
        let category = record
            .category_id
            .and_then(|id| directory.lookup(id))
            .cloned();
        if category.is_none() {
            if let Some(id) = record.category_id {
                tracing::debug!(topic_id = record.id, category_id = id, "Topic category not in directory");
            }
        }
        Self {
            id: record.id,
            title: record.title,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::SiteCategories;

    #[test]
    fn test_record_is_idempotent() {
        let mut state = UserWatchState::default();
        assert!(state.record(161, NotificationLevel::WatchingFirstPost));
        assert!(!state.record(161, NotificationLevel::WatchingFirstPost));
        assert_eq!(state.watched_first_post_category_ids.len(), 1);
        assert!(state.watched_category_ids.is_empty());
    }

    #[test]
    fn test_record_routes_by_level() {
        let mut state = UserWatchState::default();
        state.record(3, NotificationLevel::Watching);
        assert!(state.is_watching(3));
        assert!(!state.is_watching_first_post(3));

        assert!(state.record(4, NotificationLevel::WatchingFirstPost));
        assert!(!state.is_watching(4));
    }

    #[test]
    fn test_notification_level_values() {
        assert_eq!(NotificationLevel::WatchingFirstPost.as_i32(), 4);
        assert_eq!(NotificationLevel::Watching.as_i32(), 3);
    }

    #[test]
    fn test_topic_resolve() {
        let directory = SiteCategories::new([Category::new(161, "News", None)]);
        let record = TopicRecord {
            id: 10,
            title: "Hello".to_string(),
            category_id: Some(161),
        };
        let topic = Topic::resolve(record, &directory);
        assert_eq!(topic.category.map(|c| c.name), Some("News".to_string()));

        let unknown = TopicRecord {
            id: 11,
            title: "Lost".to_string(),
            category_id: Some(999),
        };
        assert!(Topic::resolve(unknown, &directory).category.is_none());
    }
}
