use crate::session::NotificationLevel;

/// One kind of prompt the banner can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffordanceKind {
    /// Watch the first post of every new topic.
    Subscribe,
    /// Watch every post.
    WatchAll,
}

impl AffordanceKind {
    pub const fn notification_level(self) -> NotificationLevel {
        match self {
            AffordanceKind::Subscribe => NotificationLevel::WatchingFirstPost,
            AffordanceKind::WatchAll => NotificationLevel::Watching,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AffordanceKind::Subscribe => "subscribe",
            AffordanceKind::WatchAll => "watch_all",
        }
    }

    pub const fn heading(self) -> &'static str {
        "Stay Informed"
    }

    pub fn prompt(self, label: &str) -> String {
        match self {
            AffordanceKind::Subscribe => format!("Get notified of all {} topics", label),
            AffordanceKind::WatchAll => format!("Receive all {} updates", label),
        }
    }

    pub const fn button(self) -> &'static str {
        match self {
            AffordanceKind::Subscribe => "Subscribe",
            AffordanceKind::WatchAll => "Watch All",
        }
    }

    pub fn confirmation(self, label: &str) -> String {
        match self {
            AffordanceKind::Subscribe => format!("✅ You're now subscribed to {}.", label),
            AffordanceKind::WatchAll => format!("✅ You'll receive all updates for {}.", label),
        }
    }

    pub fn failure(self, label: &str) -> String {
        format!("Couldn't update notifications for {}. Try again.", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffordanceStatus {
    /// Button shown and clickable.
    Ready,
    /// Request in flight; the button is disabled.
    Pending,
    /// The forum accepted the change.
    Confirmed,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub kind: AffordanceKind,
    pub status: AffordanceStatus,
}

impl Affordance {
    pub fn new(kind: AffordanceKind) -> Self {
        Self {
            kind,
            status: AffordanceStatus::Ready,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == AffordanceStatus::Ready
    }

    /// Text shown in the affordance's slot for its current status.
    pub fn message(&self, label: &str) -> String {
        match &self.status {
            AffordanceStatus::Ready | AffordanceStatus::Pending => self.kind.prompt(label),
            AffordanceStatus::Confirmed => self.kind.confirmation(label),
            AffordanceStatus::Failed { .. } => self.kind.failure(label),
        }
    }
}

/// Which affordances a shown banner carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLayout {
    Subscribe,
    Watch,
    Both,
}

/// Contents of the banner for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub category_id: i64,
    pub label: String,
    affordances: Vec<Affordance>,
}

impl Banner {
    pub(crate) fn new(category_id: i64, label: String, kinds: &[AffordanceKind]) -> Self {
        Self {
            category_id,
            label,
            affordances: kinds.iter().copied().map(Affordance::new).collect(),
        }
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    pub fn affordance(&self, kind: AffordanceKind) -> Option<&Affordance> {
        self.affordances.iter().find(|a| a.kind == kind)
    }

    pub(crate) fn affordance_mut(&mut self, kind: AffordanceKind) -> Option<&mut Affordance> {
        self.affordances.iter_mut().find(|a| a.kind == kind)
    }

    pub(crate) fn remove_affordance(&mut self, kind: AffordanceKind) {
        self.affordances.retain(|a| a.kind != kind);
    }

    pub fn is_empty(&self) -> bool {
        self.affordances.is_empty()
    }

    pub fn layout(&self) -> Option<BannerLayout> {
        let subscribe = self.affordance(AffordanceKind::Subscribe).is_some();
        let watch = self.affordance(AffordanceKind::WatchAll).is_some();
        match (subscribe, watch) {
            (true, true) => Some(BannerLayout::Both),
            (true, false) => Some(BannerLayout::Subscribe),
            (false, true) => Some(BannerLayout::Watch),
            (false, false) => None,
        }
    }
}

/// Why no banner is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenReason {
    NoUser,
    NoTopic,
    NoCategory,
    /// The category takes part in neither program.
    NotConfigured,
    /// The user already holds every offered level.
    AlreadySubscribed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerState {
    Idle,
    Evaluating,
    Hidden(HiddenReason),
    Showing(Banner),
}

/// Flat view of [`BannerState`] for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerPhase {
    Idle,
    Evaluating,
    Hidden,
    ShowingSubscribe,
    ShowingWatch,
    ShowingBoth,
}

impl BannerState {
    pub fn phase(&self) -> BannerPhase {
        match self {
            BannerState::Idle => BannerPhase::Idle,
            BannerState::Evaluating => BannerPhase::Evaluating,
            BannerState::Hidden(_) => BannerPhase::Hidden,
            BannerState::Showing(banner) => match banner.layout() {
                Some(BannerLayout::Subscribe) => BannerPhase::ShowingSubscribe,
                Some(BannerLayout::Watch) => BannerPhase::ShowingWatch,
                Some(BannerLayout::Both) => BannerPhase::ShowingBoth,
                None => BannerPhase::Idle,
            },
        }
    }

    pub fn banner(&self) -> Option<&Banner> {
        match self {
            BannerState::Showing(banner) => Some(banner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_uses_label() {
        assert_eq!(
            AffordanceKind::Subscribe.prompt("Engineering News"),
            "Get notified of all Engineering News topics"
        );
        assert_eq!(
            AffordanceKind::WatchAll.confirmation("Security"),
            "✅ You'll receive all updates for Security."
        );
        assert_eq!(AffordanceKind::WatchAll.button(), "Watch All");
    }

    #[test]
    fn test_layout_follows_affordances() {
        let mut banner = Banner::new(
            5,
            "Security".into(),
            &[AffordanceKind::Subscribe, AffordanceKind::WatchAll],
        );
        assert_eq!(banner.layout(), Some(BannerLayout::Both));

        banner.remove_affordance(AffordanceKind::Subscribe);
        assert_eq!(banner.layout(), Some(BannerLayout::Watch));
        assert_eq!(
            BannerState::Showing(banner.clone()).phase(),
            BannerPhase::ShowingWatch
        );

        banner.remove_affordance(AffordanceKind::WatchAll);
        assert!(banner.is_empty());
        assert_eq!(banner.layout(), None);
    }

    #[test]
    fn test_message_tracks_status() {
        let mut affordance = Affordance::new(AffordanceKind::Subscribe);
        assert!(affordance.is_enabled());
        affordance.status = AffordanceStatus::Pending;
        assert!(!affordance.is_enabled());
        assert_eq!(affordance.message("News"), "Get notified of all News topics");
        affordance.status = AffordanceStatus::Failed {
            error: "HTTP error: status 500".into(),
        };
        assert!(affordance.message("News").starts_with("Couldn't update"));
    }
}
