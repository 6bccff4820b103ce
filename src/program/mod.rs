//! Subscription programs: which categories offer which affordance, and how a
//! viewed category is classified against them.

mod category;
mod classifier;
mod ids;
mod settings;

pub use category::{Category, CategoryDirectory, SiteCategories};
pub use classifier::{classify, Classification};
pub use ids::CategoryIdSet;
pub use settings::SubscriptionProgramConfig;
