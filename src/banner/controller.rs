//! Per-page-view banner state machine.
//!
//! The controller owns the only record of what is on screen. It builds a
//! fresh [`Banner`] on every evaluation, tracks each affordance through its
//! request, and drives the [`Renderer`] from those transitions alone.
//!
//! Every evaluation bumps a generation counter. Action completions and
//! dismissals carry the generation they were issued under; a stale one never
//! touches the renderer.
use std::sync::Arc;
use std::time::Duration;

use super::render::Renderer;
use super::state::{
    AffordanceKind, AffordanceStatus, Banner, BannerState, HiddenReason,
};
use crate::ports::RemoteError;
use crate::program::{classify, CategoryDirectory, SubscriptionProgramConfig};
use crate::session::{NotificationLevel, Topic, UserWatchState};

/// A subscription request the host must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    pub generation: u64,
    pub category_id: i64,
    pub kind: AffordanceKind,
}

impl PendingAction {
    pub fn level(&self) -> NotificationLevel {
        self.kind.notification_level()
    }
}

/// A confirmation or failure message due to disappear after `after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dismissal {
    pub generation: u64,
    pub kind: AffordanceKind,
    pub after: Duration,
}

pub struct BannerController<R> {
    config: Arc<SubscriptionProgramConfig>,
    renderer: R,
    state: BannerState,
    generation: u64,
    dismiss_after: Duration,
}

impl<R: Renderer> BannerController<R> {
    pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

    pub fn new(config: Arc<SubscriptionProgramConfig>, renderer: R) -> Self {
        Self {
            config,
            renderer,
            state: BannerState::Idle,
            generation: 0,
            dismiss_after: Self::DEFAULT_DISMISS_AFTER,
        }
    }

    pub fn with_dismiss_after(mut self, after: Duration) -> Self {
        self.dismiss_after = after;
        self
    }

    pub fn state(&self) -> &BannerState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// A new page view has started; its context is not ready yet.
    ///
    /// Tears down whatever the previous view showed.
    pub fn begin_evaluation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.renderer.remove();
        self.state = BannerState::Evaluating;
    }

    /// Decide what the current view shows and render it.
    ///
    /// Safe to call repeatedly: the previous container is always removed
    /// before a new one is inserted.
    ///
    /// # Arguments
    ///
    /// * `user` - Signed-in user's watch lists, `None` when anonymous
    /// * `topic` - Topic on screen, `None` off topic pages
    /// * `directory` - Site categories used to resolve the parent name
    ///
    /// # Returns
    ///
    /// The new state. Invalidates every earlier [`PendingAction`] and
    /// [`Dismissal`].
    pub fn evaluate<D>(
        &mut self,
        user: Option<&UserWatchState>,
        topic: Option<&Topic>,
        directory: &D,
    ) -> &BannerState
    where
        D: CategoryDirectory + ?Sized,
    {
        self.generation = self.generation.wrapping_add(1);
        self.state = BannerState::Evaluating;

        let next = self.decide(user, topic, directory);
        tracing::debug!(
            generation = self.generation,
            phase = ?next.phase(),
            "Banner evaluated"
        );

        self.renderer.remove();
        if let BannerState::Showing(banner) = &next {
            self.renderer.render(banner);
        }
        self.state = next;
        &self.state
    }

    fn decide<D>(
        &self,
        user: Option<&UserWatchState>,
        topic: Option<&Topic>,
        directory: &D,
    ) -> BannerState
    where
        D: CategoryDirectory + ?Sized,
    {
        let Some(user) = user else {
            tracing::debug!("No user logged in");
            return BannerState::Hidden(HiddenReason::NoUser);
        };
        let Some(topic) = topic else {
            tracing::debug!("Not on a topic page");
            return BannerState::Hidden(HiddenReason::NoTopic);
        };
        let Some(category) = topic.category.as_ref() else {
            tracing::debug!(topic_id = topic.id, "Topic has no category");
            return BannerState::Hidden(HiddenReason::NoCategory);
        };

        let classification = classify(category, directory, &self.config);
        tracing::debug!(
            category_id = category.id,
            applies_subscribe = classification.applies_subscribe,
            applies_watching = classification.applies_watching,
            subscribe_name_only = classification.subscribe_name_only,
            watching_name_only = classification.watching_name_only,
            "Category classified"
        );
        if !classification.applies_any() {
            return BannerState::Hidden(HiddenReason::NotConfigured);
        }

        let needs_subscribe =
            classification.applies_subscribe && !user.is_watching_first_post(category.id);
        let needs_watch = classification.applies_watching && !user.is_watching(category.id);
        tracing::debug!(needs_subscribe, needs_watch, "Checked existing subscriptions");

        let mut kinds = Vec::with_capacity(2);
        if needs_subscribe {
            kinds.push(AffordanceKind::Subscribe);
        }
        if needs_watch {
            kinds.push(AffordanceKind::WatchAll);
        }
        if kinds.is_empty() {
            return BannerState::Hidden(HiddenReason::AlreadySubscribed);
        }

        let label = classification.label_for(needs_subscribe, needs_watch).to_string();
        BannerState::Showing(Banner::new(category.id, label, &kinds))
    }

    /// The user clicked an affordance.
    ///
    /// Marks it pending and re-renders, so a second click is ignored until
    /// [`complete`](Self::complete) runs.
    ///
    /// # Returns
    ///
    /// The request to perform, or `None` if the affordance is not on screen
    /// or is not clickable (e.g. a request is already in flight).
    pub fn activate(&mut self, kind: AffordanceKind) -> Option<PendingAction> {
        let BannerState::Showing(banner) = &mut self.state else {
            tracing::debug!(kind = kind.as_str(), "Activation without a banner, ignoring");
            return None;
        };
        let category_id = banner.category_id;
        let affordance = banner.affordance_mut(kind)?;
        if !affordance.is_enabled() {
            tracing::debug!(
                kind = kind.as_str(),
                status = ?affordance.status,
                "Affordance not clickable, ignoring"
            );
            return None;
        }

        affordance.status = AffordanceStatus::Pending;
        self.renderer.update(banner);
        Some(PendingAction {
            generation: self.generation,
            category_id,
            kind,
        })
    }

    /// Apply the outcome of a request issued by [`activate`](Self::activate).
    ///
    /// A success is recorded on `user` even when the banner it came from is
    /// gone.
    ///
    /// # Arguments
    ///
    /// * `action` - The request as returned by `activate`
    /// * `result` - Outcome reported by the transport
    /// * `user` - Watch lists to update on success; `None` if signed out since
    ///
    /// # Returns
    ///
    /// The dismissal to schedule when the on-screen affordance changed. A
    /// stale `action` (older generation) returns `None` and leaves the
    /// renderer untouched.
    pub fn complete(
        &mut self,
        action: PendingAction,
        result: Result<(), RemoteError>,
        user: Option<&mut UserWatchState>,
    ) -> Option<Dismissal> {
        match &result {
            Ok(()) => {
                if let Some(user) = user {
                    let added = user.record(action.category_id, action.level());
                    tracing::info!(
                        category_id = action.category_id,
                        level = action.level().as_i32(),
                        added,
                        "Notification level updated"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    category_id = action.category_id,
                    kind = action.kind.as_str(),
                    error = %e,
                    "Failed to update notification level"
                );
            }
        }

        if action.generation != self.generation {
            tracing::debug!(
                action_generation = action.generation,
                generation = self.generation,
                "Discarding stale action result"
            );
            return None;
        }
        let BannerState::Showing(banner) = &mut self.state else {
            return None;
        };
        let affordance = banner.affordance_mut(action.kind)?;
        if affordance.status != AffordanceStatus::Pending {
            return None;
        }

        affordance.status = match result {
            Ok(()) => AffordanceStatus::Confirmed,
            Err(e) => AffordanceStatus::Failed {
                error: e.to_string(),
            },
        };
        self.renderer.update(banner);
        Some(Dismissal {
            generation: self.generation,
            kind: action.kind,
            after: self.dismiss_after,
        })
    }

    /// Clear a confirmation or failure message.
    ///
    /// A confirmed affordance leaves the banner (the whole banner goes when
    /// none remain). A failed one becomes clickable again.
    pub fn dismiss(&mut self, dismissal: Dismissal) -> &BannerState {
        if dismissal.generation != self.generation {
            return &self.state;
        }
        let BannerState::Showing(banner) = &mut self.state else {
            return &self.state;
        };
        let Some(affordance) = banner.affordance_mut(dismissal.kind) else {
            return &self.state;
        };

        match affordance.status {
            AffordanceStatus::Confirmed => banner.remove_affordance(dismissal.kind),
            AffordanceStatus::Failed { .. } => affordance.status = AffordanceStatus::Ready,
            AffordanceStatus::Ready | AffordanceStatus::Pending => return &self.state,
        }

        if banner.is_empty() {
            tracing::debug!("Banner dismissed");
            self.renderer.remove();
            self.state = BannerState::Idle;
        } else {
            self.renderer.update(banner);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::test_support::RecordingRenderer;
    use crate::banner::BannerPhase;
    use crate::program::{Category, CategoryIdSet, SiteCategories};
    use pretty_assertions::assert_eq;

    fn directory() -> SiteCategories {
        SiteCategories::new([
            Category::new(2, "Engineering", None),
            Category::new(5, "Security", Some(2)),
            Category::new(161, "News", None),
            Category::new(7, "Random", None),
        ])
    }

    fn program() -> Arc<SubscriptionProgramConfig> {
        Arc::new(SubscriptionProgramConfig {
            subscribe_category_ids: CategoryIdSet::parse("161|5"),
            watching_category_ids: CategoryIdSet::parse("5"),
            ..Default::default()
        })
    }

    fn topic_in(category_id: i64) -> Topic {
        Topic {
            id: 100,
            title: "A topic".to_string(),
            category: directory().lookup(category_id).cloned(),
        }
    }

    fn controller() -> BannerController<RecordingRenderer> {
        BannerController::new(program(), RecordingRenderer::default())
    }

    fn controller_with(config: SubscriptionProgramConfig) -> BannerController<RecordingRenderer> {
        BannerController::new(Arc::new(config), RecordingRenderer::default())
    }

    #[test]
    fn test_missing_user_hides() {
        let mut c = controller();
        let state = c.evaluate(None, Some(&topic_in(161)), &directory());
        assert_eq!(state, &BannerState::Hidden(HiddenReason::NoUser));
        assert!(c.renderer().containers.is_empty());
    }

    #[test]
    fn test_missing_topic_and_category_hide() {
        let mut c = controller();
        let user = UserWatchState::default();
        assert_eq!(
            c.evaluate(Some(&user), None, &directory()),
            &BannerState::Hidden(HiddenReason::NoTopic)
        );

        let uncategorised = Topic {
            id: 1,
            title: "x".into(),
            category: None,
        };
        assert_eq!(
            c.evaluate(Some(&user), Some(&uncategorised), &directory()),
            &BannerState::Hidden(HiddenReason::NoCategory)
        );
    }

    #[test]
    fn test_unconfigured_category_hides() {
        let mut c = controller();
        let user = UserWatchState::default();
        let state = c.evaluate(Some(&user), Some(&topic_in(7)), &directory());
        assert_eq!(state, &BannerState::Hidden(HiddenReason::NotConfigured));
    }

    #[test]
    fn test_subscribe_only_banner() {
        let mut c = controller();
        let user = UserWatchState::default();
        let state = c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        assert_eq!(state.phase(), BannerPhase::ShowingSubscribe);

        let containers = &c.renderer().containers;
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].label, "News");
        assert_eq!(containers[0].affordances().len(), 1);
    }

    #[test]
    fn test_both_affordances_share_label() {
        let mut c = controller();
        let user = UserWatchState::default();
        let state = c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        assert_eq!(state.phase(), BannerPhase::ShowingBoth);
        assert_eq!(state.banner().unwrap().label, "Engineering Security");
    }

    #[test]
    fn test_watching_exception_ignored_when_only_subscribe_shown() {
        let mut c = controller_with(SubscriptionProgramConfig {
            subscribe_category_ids: CategoryIdSet::parse("5"),
            watching_category_ids: CategoryIdSet::parse("5"),
            watching_name_only_exceptions: CategoryIdSet::parse("5"),
            ..Default::default()
        });
        let mut user = UserWatchState::default();
        user.record(5, NotificationLevel::Watching);

        let state = c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        assert_eq!(state.phase(), BannerPhase::ShowingSubscribe);
        assert_eq!(state.banner().unwrap().label, "Engineering Security");
    }

    #[test]
    fn test_watching_exception_applies_when_watch_shown() {
        let mut c = controller_with(SubscriptionProgramConfig {
            subscribe_category_ids: CategoryIdSet::parse("5"),
            watching_category_ids: CategoryIdSet::parse("5"),
            watching_name_only_exceptions: CategoryIdSet::parse("5"),
            ..Default::default()
        });
        let user = UserWatchState::default();

        let state = c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        assert_eq!(state.phase(), BannerPhase::ShowingBoth);
        assert_eq!(state.banner().unwrap().label, "Security");
    }

    #[test]
    fn test_already_subscribed_suppresses() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        user.record(161, NotificationLevel::WatchingFirstPost);
        let state = c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        assert_eq!(state, &BannerState::Hidden(HiddenReason::AlreadySubscribed));
    }

    #[test]
    fn test_partial_subscription_shows_remaining() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        user.record(5, NotificationLevel::WatchingFirstPost);
        let state = c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        assert_eq!(state.phase(), BannerPhase::ShowingWatch);
    }

    #[test]
    fn test_repeated_evaluation_keeps_single_container() {
        let mut c = controller();
        let user = UserWatchState::default();
        let first = c.evaluate(Some(&user), Some(&topic_in(5)), &directory()).clone();
        let second = c.evaluate(Some(&user), Some(&topic_in(5)), &directory()).clone();
        let _ = c.evaluate(Some(&user), Some(&topic_in(5)), &directory());

        assert_eq!(first, second);
        assert_eq!(c.renderer().containers.len(), 1);
    }

    #[test]
    fn test_hidden_evaluation_removes_previous_banner() {
        let mut c = controller();
        let user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        c.evaluate(Some(&user), Some(&topic_in(7)), &directory());
        assert!(c.renderer().containers.is_empty());
    }

    #[test]
    fn test_activate_disables_until_complete() {
        let mut c = controller();
        let user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());

        let action = c.activate(AffordanceKind::Subscribe).unwrap();
        assert_eq!(action.category_id, 161);
        assert_eq!(action.level(), NotificationLevel::WatchingFirstPost);

        // Second click while the first is in flight does nothing.
        assert!(c.activate(AffordanceKind::Subscribe).is_none());
        // Not offered here.
        assert!(c.activate(AffordanceKind::WatchAll).is_none());

        let shown = &c.renderer().containers[0];
        assert_eq!(
            shown.affordance(AffordanceKind::Subscribe).unwrap().status,
            AffordanceStatus::Pending
        );
    }

    #[test]
    fn test_success_records_confirms_and_dismisses() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());

        let action = c.activate(AffordanceKind::Subscribe).unwrap();
        let dismissal = c.complete(action, Ok(()), Some(&mut user)).unwrap();
        assert_eq!(dismissal.after, Duration::from_secs(5));
        assert!(user.is_watching_first_post(161));

        let shown = &c.renderer().containers[0];
        assert_eq!(
            shown.affordance(AffordanceKind::Subscribe).unwrap().message(&shown.label),
            "✅ You're now subscribed to News."
        );

        let state = c.dismiss(dismissal);
        assert_eq!(state, &BannerState::Idle);
        assert!(c.renderer().containers.is_empty());
    }

    #[test]
    fn test_repeated_success_records_once() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        let action = c.activate(AffordanceKind::Subscribe).unwrap();

        c.complete(action, Ok(()), Some(&mut user));
        c.complete(action, Ok(()), Some(&mut user));
        assert_eq!(
            user.watched_first_post_category_ids.iter().copied().collect::<Vec<_>>(),
            vec![161]
        );
    }

    #[test]
    fn test_failure_leaves_state_and_allows_retry() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());

        let action = c.activate(AffordanceKind::Subscribe).unwrap();
        let dismissal = c
            .complete(action, Err(RemoteError::HttpStatus(500)), Some(&mut user))
            .unwrap();
        assert!(!user.is_watching_first_post(161));
        assert!(matches!(
            c.state().banner().unwrap().affordance(AffordanceKind::Subscribe).unwrap().status,
            AffordanceStatus::Failed { .. }
        ));
        // Failed affordance is not clickable until the message clears.
        assert!(c.activate(AffordanceKind::Subscribe).is_none());

        c.dismiss(dismissal);
        assert_eq!(c.state().phase(), BannerPhase::ShowingSubscribe);
        assert!(c.activate(AffordanceKind::Subscribe).is_some());
    }

    #[test]
    fn test_affordances_are_independent() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(5)), &directory());

        let subscribe = c.activate(AffordanceKind::Subscribe).unwrap();
        let watch = c.activate(AffordanceKind::WatchAll).unwrap();

        let failed = c
            .complete(watch, Err(RemoteError::Timeout), Some(&mut user))
            .unwrap();
        let confirmed = c.complete(subscribe, Ok(()), Some(&mut user)).unwrap();

        c.dismiss(confirmed);
        assert_eq!(c.state().phase(), BannerPhase::ShowingWatch);
        c.dismiss(failed);
        let banner = c.state().banner().unwrap();
        assert!(banner.affordance(AffordanceKind::WatchAll).unwrap().is_enabled());
        assert!(user.is_watching_first_post(5));
        assert!(!user.is_watching(5));
    }

    #[test]
    fn test_stale_completion_does_not_touch_new_banner() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        let action = c.activate(AffordanceKind::Subscribe).unwrap();

        // User navigates before the request resolves.
        c.begin_evaluation();
        c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        let before = c.renderer().containers.clone();

        assert!(c.complete(action, Ok(()), Some(&mut user)).is_none());
        assert_eq!(c.renderer().containers, before);
        // The forum accepted it, so the user record still reflects it.
        assert!(user.is_watching_first_post(161));
    }

    #[test]
    fn test_stale_dismissal_ignored() {
        let mut c = controller();
        let mut user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        let action = c.activate(AffordanceKind::Subscribe).unwrap();
        let dismissal = c.complete(action, Ok(()), Some(&mut user)).unwrap();

        c.evaluate(Some(&user), Some(&topic_in(5)), &directory());
        c.dismiss(dismissal);
        assert_eq!(c.state().phase(), BannerPhase::ShowingWatch);
    }

    #[test]
    fn test_begin_evaluation_tears_down() {
        let mut c = controller();
        let user = UserWatchState::default();
        c.evaluate(Some(&user), Some(&topic_in(161)), &directory());
        c.begin_evaluation();
        assert_eq!(c.state(), &BannerState::Evaluating);
        assert!(c.renderer().containers.is_empty());
        assert!(c.activate(AffordanceKind::Subscribe).is_none());
    }
}
