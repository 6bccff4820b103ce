use std::collections::HashMap;

/// A forum category as seen by the banner.
///
/// Categories form a two-level tree; only the direct parent is ever consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_category_id: Option<i64>,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>, parent_category_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_category_id,
        }
    }
}

/// Resolves category ids to their records (used for parent lookup).
pub trait CategoryDirectory {
    fn lookup(&self, id: i64) -> Option<&Category>;
}

impl CategoryDirectory for HashMap<i64, Category> {
    fn lookup(&self, id: i64) -> Option<&Category> {
        self.get(&id)
    }
}

/// Every category the site exposes, indexed by id.
///
/// Loaded once per session from the host.
#[derive(Debug, Clone, Default)]
pub struct SiteCategories {
    by_id: HashMap<i64, Category>,
}

impl SiteCategories {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            by_id: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl CategoryDirectory for SiteCategories {
    fn lookup(&self, id: i64) -> Option<&Category> {
        self.by_id.get(&id)
    }
}
