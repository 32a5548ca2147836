// Notification service - fixed-interval polling for the session user's notifications
use crate::application::errors::ApiError;
use crate::application::repositories::NotificationRepository;
use crate::application::session_context::SessionContext;
use crate::domain::id::EntityId;
use crate::domain::notification::NotificationFeed;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    session: Arc<SessionContext>,
    feed: watch::Sender<NotificationFeed>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepository>, session: Arc<SessionContext>) -> Self {
        let (feed, _) = watch::channel(NotificationFeed::default());
        Self {
            repository,
            session,
            feed,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationFeed> {
        self.feed.subscribe()
    }

    pub fn latest(&self) -> NotificationFeed {
        self.feed.borrow().clone()
    }

    /// Fetch the feed for the logged-in user. Without a session the feed is
    /// cleared and nothing is requested.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(session) = self.session.current() else {
            self.feed.send_if_modified(|feed| {
                let had_items = !feed.items.is_empty();
                *feed = NotificationFeed::default();
                had_items
            });
            return Ok(());
        };

        let items = self.repository.list_for_user(&session.user.id).await?;
        // Logout or a new login while the request was in flight owns the feed now
        if self.session.current().as_ref() != Some(&session) {
            tracing::debug!(user = %session.user.id, "dropping notifications for a stale session");
            return Ok(());
        }
        let next = NotificationFeed::new(items);
        tracing::debug!(user = %session.user.id, unread = next.unread, "notifications refreshed");
        self.feed.send_if_modified(|feed| {
            if *feed == next {
                return false;
            }
            *feed = next;
            true
        });
        Ok(())
    }

    pub async fn mark_read(&self, id: &EntityId) -> Result<NotificationFeed, ApiError> {
        self.session.require()?;
        self.repository.mark_read(id).await?;
        self.feed.send_modify(|feed| feed.mark_read(id));
        Ok(self.latest())
    }

    pub async fn delete(&self, id: &EntityId) -> Result<NotificationFeed, ApiError> {
        self.session.require()?;
        self.repository.delete(id).await?;
        self.feed.send_modify(|feed| feed.remove(id));
        Ok(self.latest())
    }
}

/// Owns the polling task; dropping the handle stops the timer.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_poller(service: Arc<NotificationService>, period: Duration) -> PollerHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = service.refresh().await {
                // Keep the previous feed; the next tick retries
                tracing::warn!(error = %e, "notification poll failed");
            }
        }
    });
    tracing::info!(period_secs = period.as_secs(), "notification poller started");
    PollerHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session_context::tests::session_for;
    use crate::domain::notification::Notification;
    use crate::domain::session::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct FakeNotifications {
        polls: AtomicUsize,
        fail: AtomicBool,
        /// When set, `list_for_user` waits for `release` before answering
        hold: AtomicBool,
        release: Notify,
    }

    impl FakeNotifications {
        fn new() -> Self {
            Self {
                polls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                hold: AtomicBool::new(false),
                release: Notify::new(),
            }
        }
    }

    fn note(id: &str) -> Notification {
        Notification {
            id: EntityId::new(id),
            title: Some("Appointment".to_string()),
            message: format!("Appointment {} confirmed", id),
            kind: None,
            read: false,
            created_at: None,
        }
    }

    #[async_trait]
    impl NotificationRepository for FakeNotifications {
        async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<Notification>, ApiError> {
            assert_eq!(user_id.as_str(), "u1");
            self.polls.fetch_add(1, Ordering::SeqCst);
            if self.hold.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Network("connection refused".to_string()));
            }
            Ok(vec![note("1"), note("2")])
        }

        async fn mark_read(&self, _id: &EntityId) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete(&self, _id: &EntityId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn logged_in() -> Arc<SessionContext> {
        let session = Arc::new(SessionContext::new());
        session.establish(session_for(Role::Patient));
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_until_dropped() {
        let repository = Arc::new(FakeNotifications::new());
        let service = Arc::new(NotificationService::new(repository.clone(), logged_in()));

        let handle = spawn_poller(service.clone(), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(61)).await;
        let polled = repository.polls.load(Ordering::SeqCst);
        assert!(polled >= 2, "expected at least two polls, got {}", polled);
        assert_eq!(service.latest().unread, 2);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(repository.polls.load(Ordering::SeqCst), polled);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_feed() {
        let repository = Arc::new(FakeNotifications::new());
        let service = NotificationService::new(repository.clone(), logged_in());
        service.refresh().await.unwrap();

        repository.fail.store(true, Ordering::SeqCst);
        assert!(service.refresh().await.is_err());
        assert_eq!(service.latest().items.len(), 2);
    }

    #[tokio::test]
    async fn test_logged_out_poll_requests_nothing() {
        let repository = Arc::new(FakeNotifications::new());
        let service = NotificationService::new(repository.clone(), Arc::new(SessionContext::new()));

        service.refresh().await.unwrap();
        assert_eq!(repository.polls.load(Ordering::SeqCst), 0);
        assert!(service.latest().items.is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_and_delete_update_feed() {
        let repository = Arc::new(FakeNotifications::new());
        let service = NotificationService::new(repository, logged_in());
        let updates = service.subscribe();
        service.refresh().await.unwrap();
        assert!(updates.has_changed().unwrap());

        let feed = service.mark_read(&EntityId::new("1")).await.unwrap();
        assert_eq!(feed.unread, 1);

        let feed = service.delete(&EntityId::new("2")).await.unwrap();
        assert_eq!(feed.unread, 0);
        assert_eq!(feed.items.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_in_flight_across_logout_is_dropped() {
        let repository = Arc::new(FakeNotifications::new());
        repository.hold.store(true, Ordering::SeqCst);
        let session = logged_in();
        let service = Arc::new(NotificationService::new(repository.clone(), session.clone()));

        let poll = {
            let service = service.clone();
            tokio::spawn(async move { service.refresh().await })
        };
        while repository.polls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Same sequence as the logout handler
        session.invalidate();
        service.refresh().await.unwrap();
        repository.release.notify_waiters();

        poll.await.unwrap().unwrap();
        assert!(service.latest().items.is_empty());
    }
}
