use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{NewNotification, Notification, NotificationKind};

pub const DEFAULT_DURATION_MS: u64 = 5000;

struct Shared {
    items: watch::Sender<Vec<Notification>>,
    timers: Mutex<HashMap<Uuid, AbortHandle>>,
    default_duration_ms: u64,
}

impl Shared {
    fn timers(&self) -> MutexGuard<'_, HashMap<Uuid, AbortHandle>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove_item(&self, id: Uuid) -> bool {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|n| n.id != id);
            items.len() != before
        })
    }
}

/// FIFO queue of toasts. Each entry with a non-zero duration is removed by its
/// own timer task; dismissing or clearing cancels the pending timers.
#[derive(Clone)]
pub struct NotificationQueue(Arc<Shared>);

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MS)
    }
}

impl NotificationQueue {
    pub fn new(default_duration_ms: u64) -> Self {
        let (items, _rx) = watch::channel(Vec::new());
        Self(Arc::new(Shared {
            items,
            timers: Mutex::new(HashMap::new()),
            default_duration_ms,
        }))
    }

    pub fn enqueue(&self, new: NewNotification) -> Uuid {
        let id = Uuid::new_v4();
        let duration_ms = new.duration_ms.unwrap_or(self.0.default_duration_ms);
        let notification = Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            duration_ms,
            action: new.action,
        };
        debug!("Queueing {:?} notification '{}'", notification.kind, notification.title);
        self.0.items.send_modify(|items| items.push(notification));

        if duration_ms > 0 {
            self.schedule_removal(id, duration_ms);
        }
        id
    }

    fn schedule_removal(&self, id: Uuid, duration_ms: u64) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime, notification {} will stay until dismissed", id);
                return;
            }
        };

        // The timer task takes this lock in `expire`, so it cannot run ahead of the insert.
        let mut timers = self.0.timers();
        let weak: Weak<Shared> = Arc::downgrade(&self.0);
        let task = handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            if let Some(shared) = weak.upgrade() {
                NotificationQueue(shared).expire(id);
            }
        });
        timers.insert(id, task.abort_handle());
    }

    fn expire(&self, id: Uuid) {
        self.0.timers().remove(&id);
        if self.0.remove_item(id) {
            debug!("Notification {} expired", id);
        }
    }

    pub fn success(&self, title: impl Into<String>, message: Option<&str>) -> Uuid {
        self.enqueue(with_message(NotificationKind::Success, title, message))
    }

    pub fn error(&self, title: impl Into<String>, message: Option<&str>) -> Uuid {
        self.enqueue(with_message(NotificationKind::Error, title, message))
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<&str>) -> Uuid {
        self.enqueue(with_message(NotificationKind::Warning, title, message))
    }

    pub fn info(&self, title: impl Into<String>, message: Option<&str>) -> Uuid {
        self.enqueue(with_message(NotificationKind::Info, title, message))
    }

    /// Remove one notification. Unknown ids are ignored.
    pub fn dismiss(&self, id: Uuid) {
        if let Some(timer) = self.0.timers().remove(&id) {
            timer.abort();
        }
        self.0.remove_item(id);
    }

    pub fn clear(&self) {
        for (_, timer) in self.0.timers().drain() {
            timer.abort();
        }
        self.0.items.send_if_modified(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        });
    }

    pub fn list(&self) -> Vec<Notification> {
        self.0.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.0.items.subscribe()
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.0.timers().len()
    }
}

fn with_message(kind: NotificationKind, title: impl Into<String>, message: Option<&str>) -> NewNotification {
    let new = NewNotification::new(kind, title);
    match message {
        Some(message) => new.message(message),
        None => new,
    }
}
