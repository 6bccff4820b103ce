//! Decides which subscription programs apply to a category and how the
//! category is named on the banner.
//!
//! Pure: no I/O and no state beyond its arguments.
use super::category::{Category, CategoryDirectory};
use super::settings::SubscriptionProgramConfig;

/// Outcome of classifying one category against the configured programs.
///
/// Recomputed on every page view and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category_id: i64,
    pub applies_subscribe: bool,
    pub applies_watching: bool,
    /// The category's own name, e.g. "Security".
    pub name: String,
    /// Parent-prefixed name when the parent resolves, e.g. "Engineering Security".
    pub qualified_name: String,
    pub subscribe_name_only: bool,
    pub watching_name_only: bool,
}

impl Classification {
    pub fn applies_any(&self) -> bool {
        self.applies_subscribe || self.applies_watching
    }

    /// Banner label given which affordances end up shown.
    ///
    /// The bare name is used only when a shown affordance's program lists
    /// this category as a name-only exception.
    pub fn label_for(&self, shows_subscribe: bool, shows_watching: bool) -> &str {
        let name_only = (shows_subscribe && self.subscribe_name_only)
            || (shows_watching && self.watching_name_only);
        if name_only {
            &self.name
        } else {
            &self.qualified_name
        }
    }
}

/// Classify `category` against `config`.
///
/// The parent's name is prefixed when the parent resolves. Grandparents are
/// never consulted.
pub fn classify<D>(
    category: &Category,
    directory: &D,
    config: &SubscriptionProgramConfig,
) -> Classification
where
    D: CategoryDirectory + ?Sized,
{
    Classification {
        category_id: category.id,
        applies_subscribe: config.offers_subscribe(category.id),
        applies_watching: config.offers_watching(category.id),
        name: category.name.clone(),
        qualified_name: qualified_name(category, directory),
        subscribe_name_only: config.is_subscribe_name_only(category.id),
        watching_name_only: config.is_watching_name_only(category.id),
    }
}

fn qualified_name<D>(category: &Category, directory: &D) -> String
where
    D: CategoryDirectory + ?Sized,
{
    let parent = category
        .parent_category_id
        .filter(|parent_id| *parent_id != category.id)
        .and_then(|parent_id| directory.lookup(parent_id));

    match parent {
        Some(parent) => format!("{} {}", parent.name, category.name),
        None => category.name.clone(),
    }
}
