//! Wires the controller to the host: page-change dispatch, background
//! requests, and timers.
//!
//! The host calls [`BannerRuntime::page_changed`] on initial load and on every
//! navigation, forwards affordance clicks to [`BannerRuntime::activate`], and
//! feeds every [`BannerEvent`] it receives back into
//! [`BannerRuntime::handle_event`]. All state changes happen on the host's
//! task; spawned tasks only report back through the channel.
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;

use super::controller::{BannerController, Dismissal, PendingAction};
use super::render::Renderer;
use super::state::{AffordanceKind, BannerState};
use crate::ports::{ContextProvider, RemoteError, SubscriptionTransport};
use crate::program::SiteCategories;
use crate::session::{CurrentUser, Topic, TopicRecord};

/// Results of background work, delivered to the host's event loop.
#[derive(Debug)]
pub enum BannerEvent {
    /// The debounce after a navigation elapsed.
    EvaluationDue { navigation: u64 },
    TopicLoaded {
        navigation: u64,
        result: Result<Option<TopicRecord>, RemoteError>,
    },
    ActionFinished {
        action: PendingAction,
        result: Result<(), RemoteError>,
    },
    DismissDue(Dismissal),
}

pub struct BannerRuntime<R> {
    controller: BannerController<R>,
    provider: Arc<dyn ContextProvider>,
    transport: Arc<dyn SubscriptionTransport>,
    directory: SiteCategories,
    user: Option<CurrentUser>,
    evaluation_delay: Duration,
    navigation: u64,
    current_url: Option<String>,
    topic: Option<Topic>,
    event_tx: mpsc::Sender<BannerEvent>,
}

impl<R: Renderer> BannerRuntime<R> {
    /// Delay between a navigation and its evaluation.
    pub const DEFAULT_EVALUATION_DELAY: Duration = Duration::from_millis(250);

    pub fn new(
        controller: BannerController<R>,
        provider: Arc<dyn ContextProvider>,
        transport: Arc<dyn SubscriptionTransport>,
        event_tx: mpsc::Sender<BannerEvent>,
    ) -> Self {
        Self {
            controller,
            provider,
            transport,
            directory: SiteCategories::default(),
            user: None,
            evaluation_delay: Self::DEFAULT_EVALUATION_DELAY,
            navigation: 0,
            current_url: None,
            topic: None,
            event_tx,
        }
    }

    pub fn with_evaluation_delay(mut self, delay: Duration) -> Self {
        self.evaluation_delay = delay;
        self
    }

    /// Load the session-wide context: the signed-in user and the category
    /// directory.
    pub async fn load_session(&mut self) -> Result<(), RemoteError> {
        let (user, categories) =
            tokio::try_join!(self.provider.current_user(), self.provider.site_categories())?;
        self.directory = SiteCategories::new(categories);
        match &user {
            Some(user) => tracing::info!(
                username = %user.username,
                categories = self.directory.len(),
                "Session loaded"
            ),
            None => tracing::info!(categories = self.directory.len(), "Anonymous session loaded"),
        }
        self.user = user;
        Ok(())
    }

    pub fn state(&self) -> &BannerState {
        self.controller.state()
    }

    pub fn controller(&self) -> &BannerController<R> {
        &self.controller
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// The topic of the last completed evaluation.
    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    /// True once the last navigation has been evaluated.
    pub fn is_settled(&self) -> bool {
        !matches!(self.controller.state(), BannerState::Evaluating)
    }

    /// Entry point for initial load and every navigation.
    ///
    /// Removes the current banner at once and supersedes any evaluation
    /// still in progress: topic loads and action results from earlier
    /// navigations are dropped when they arrive.
    ///
    /// # Arguments
    ///
    /// * `url` - Address of the page now on screen
    ///
    /// # Panic Safety
    ///
    /// Only the debounce timer is spawned here, and it does nothing but send
    /// [`BannerEvent::EvaluationDue`]. The topic fetch runs later from
    /// [`handle_event`](Self::handle_event) under the same panic guard as
    /// every other background task.
    pub fn page_changed(&mut self, url: &str) {
        self.navigation = self.navigation.wrapping_add(1);
        let navigation = self.navigation;
        tracing::debug!(url, navigation, "Page changed");

        self.current_url = Some(url.to_string());
        self.topic = None;
        self.controller.begin_evaluation();

        let tx = self.event_tx.clone();
        let delay = self.evaluation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            send(&tx, BannerEvent::EvaluationDue { navigation }).await;
        });
    }

    /// Forward a click on an affordance. Returns true if a request started.
    pub fn activate(&mut self, kind: AffordanceKind) -> bool {
        let Some(action) = self.controller.activate(kind) else {
            return false;
        };
        tracing::debug!(
            category_id = action.category_id,
            kind = kind.as_str(),
            "Spawning notification level request"
        );

        let transport = Arc::clone(&self.transport);
        spawn_guarded(
            "set_notification_level",
            self.event_tx.clone(),
            async move {
                let result = transport
                    .set_notification_level(action.category_id, action.level())
                    .await;
                BannerEvent::ActionFinished { action, result }
            },
            move |error| BannerEvent::ActionFinished {
                action,
                result: Err(RemoteError::Aborted(error)),
            },
        );
        true
    }

    pub fn handle_event(&mut self, event: BannerEvent) {
        match event {
            BannerEvent::EvaluationDue { navigation } => {
                if navigation != self.navigation {
                    tracing::debug!(navigation, "Evaluation superseded by newer navigation");
                    return;
                }
                self.load_topic(navigation);
            }
            BannerEvent::TopicLoaded { navigation, result } => {
                if navigation != self.navigation {
                    tracing::debug!(navigation, "Discarding topic for superseded navigation");
                    return;
                }
                let record = result.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to load topic, treating page as topic-less");
                    None
                });
                self.evaluate(record);
            }
            BannerEvent::ActionFinished { action, result } => {
                let user = self.user.as_mut().map(|u| &mut u.watch_state);
                if let Some(dismissal) = self.controller.complete(action, result, user) {
                    self.schedule_dismissal(dismissal);
                }
            }
            BannerEvent::DismissDue(dismissal) => {
                self.controller.dismiss(dismissal);
            }
        }
    }

    fn load_topic(&mut self, navigation: u64) {
        // No point fetching a topic for an anonymous session.
        if self.user.is_none() {
            self.evaluate(None);
            return;
        }
        let Some(url) = self.current_url.clone() else {
            self.evaluate(None);
            return;
        };

        let provider = Arc::clone(&self.provider);
        spawn_guarded(
            "topic_at",
            self.event_tx.clone(),
            async move {
                let result = provider.topic_at(&url).await;
                BannerEvent::TopicLoaded { navigation, result }
            },
            move |error| BannerEvent::TopicLoaded {
                navigation,
                result: Err(RemoteError::Aborted(error)),
            },
        );
    }

    fn evaluate(&mut self, record: Option<TopicRecord>) {
        let topic = record.map(|record| Topic::resolve(record, &self.directory));
        let user = self.user.as_ref().map(|u| &u.watch_state);
        self.controller.evaluate(user, topic.as_ref(), &self.directory);
        self.topic = topic;
    }

    fn schedule_dismissal(&self, dismissal: Dismissal) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(dismissal.after).await;
            send(&tx, BannerEvent::DismissDue(dismissal)).await;
        });
    }
}

async fn send(tx: &mpsc::Sender<BannerEvent>, event: BannerEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::debug!(error = %e, "Banner event dropped (receiver gone)");
    }
}

/// Spawn `future` and deliver its event. A panic is logged and converted
/// into the event built by `on_panic`, so the controller never waits on a
/// request that will not finish.
fn spawn_guarded<F, P>(task: &'static str, tx: mpsc::Sender<BannerEvent>, future: F, on_panic: P)
where
    F: std::future::Future<Output = BannerEvent> + Send + 'static,
    P: FnOnce(String) -> BannerEvent + Send + 'static,
{
    tokio::spawn(async move {
        let event = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(event) => event,
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&'static str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                tracing::error!(task, error = %message, "Background task panicked");
                on_panic(message)
            }
        };
        send(&tx, event).await;
    });
}
