use serde::Deserialize;

use super::ids::CategoryIdSet;

/// The four category lists that drive the banner.
///
/// Loaded once per session and never mutated afterwards. Field names on the
/// wire follow the theme-setting names (`subscribe_categories`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriptionProgramConfig {
    /// Categories offering the "first post" subscribe affordance.
    #[serde(rename = "subscribe_categories")]
    pub subscribe_category_ids: CategoryIdSet,

    /// Categories offering the "watch all" affordance.
    #[serde(rename = "watching_categories")]
    pub watching_category_ids: CategoryIdSet,

    /// Subscribe categories whose label omits the parent's name.
    #[serde(rename = "subscribe_category_name_only_exceptions")]
    pub subscribe_name_only_exceptions: CategoryIdSet,

    /// Watching categories whose label omits the parent's name.
    #[serde(rename = "watching_category_name_only_exceptions")]
    pub watching_name_only_exceptions: CategoryIdSet,
}

impl SubscriptionProgramConfig {
    /// Name-only exceptions count as members of their program.
    pub fn offers_subscribe(&self, category_id: i64) -> bool {
        self.subscribe_category_ids.contains(category_id)
            || self.subscribe_name_only_exceptions.contains(category_id)
    }

    pub fn offers_watching(&self, category_id: i64) -> bool {
        self.watching_category_ids.contains(category_id)
            || self.watching_name_only_exceptions.contains(category_id)
    }

    /// The subscribe prompt names this category without its parent.
    pub fn is_subscribe_name_only(&self, category_id: i64) -> bool {
        self.subscribe_name_only_exceptions.contains(category_id)
    }

    /// The watch-all prompt names this category without its parent.
    pub fn is_watching_name_only(&self, category_id: i64) -> bool {
        self.watching_name_only_exceptions.contains(category_id)
    }

    /// True when no category takes part in either program.
    pub fn is_empty(&self) -> bool {
        self.subscribe_category_ids.is_empty()
            && self.watching_category_ids.is_empty()
            && self.subscribe_name_only_exceptions.is_empty()
            && self.watching_name_only_exceptions.is_empty()
    }
}
