//! Transient user notifications.
//!
//! Alerts report validation and operation outcomes; toasts confirm clipboard
//! and panel actions. Both expire on their own. The queue is bounded; every
//! outcome gets its own entry, and only callers that opt in through
//! [`NotificationCenter::alert_once`] coalesce with an identical alert on screen.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use shared::domain::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Alert,
    Toast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Entering,
    Shown,
    Leaving,
}

/// Display windows for both presentations, measured from creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTiming {
    pub alert_visible: Duration,
    pub alert_fade: Duration,
    pub toast_enter: Duration,
    pub toast_visible: Duration,
    pub toast_exit: Duration,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            alert_visible: Duration::from_millis(5000),
            alert_fade: Duration::from_millis(300),
            toast_enter: Duration::from_millis(100),
            toast_visible: Duration::from_millis(3000),
            toast_exit: Duration::from_millis(300),
        }
    }
}

impl NotificationTiming {
    pub fn lifetime(&self, presentation: Presentation) -> Duration {
        match presentation {
            Presentation::Alert => self.alert_visible + self.alert_fade,
            Presentation::Toast => self.toast_visible.max(self.toast_enter) + self.toast_exit,
        }
    }

    /// `None` once the notification has expired.
    pub fn phase_at(&self, presentation: Presentation, age: Duration) -> Option<NotificationPhase> {
        match presentation {
            Presentation::Alert => {
                if age < self.alert_visible {
                    Some(NotificationPhase::Shown)
                } else if age < self.lifetime(presentation) {
                    Some(NotificationPhase::Leaving)
                } else {
                    None
                }
            }
            Presentation::Toast => {
                let leave_at = self.toast_visible.max(self.toast_enter);
                if age < self.toast_enter {
                    Some(NotificationPhase::Entering)
                } else if age < leave_at {
                    Some(NotificationPhase::Shown)
                } else if age < self.lifetime(presentation) {
                    Some(NotificationPhase::Leaving)
                } else {
                    None
                }
            }
        }
    }

    pub fn opacity_at(&self, presentation: Presentation, age: Duration) -> f32 {
        match self.phase_at(presentation, age) {
            None => 0.0,
            Some(NotificationPhase::Shown) => 1.0,
            Some(NotificationPhase::Entering) => ratio(age, self.toast_enter),
            Some(NotificationPhase::Leaving) => {
                let (leave_at, span) = match presentation {
                    Presentation::Alert => (self.alert_visible, self.alert_fade),
                    Presentation::Toast => {
                        (self.toast_visible.max(self.toast_enter), self.toast_exit)
                    }
                };
                1.0 - ratio(age.saturating_sub(leave_at), span)
            }
        }
    }
}

fn ratio(elapsed: Duration, span: Duration) -> f32 {
    if span.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / span.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: NotificationId,
    text: String,
    kind: NotificationKind,
    presentation: Presentation,
    created_at: Instant,
}

impl Notification {
    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VisibleNotification<'a> {
    pub notification: &'a Notification,
    pub phase: NotificationPhase,
    pub opacity: f32,
}

#[derive(Debug)]
pub struct NotificationCenter {
    items: VecDeque<Notification>,
    timing: NotificationTiming,
    capacity: usize,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new(timing: NotificationTiming, capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            timing,
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Queues a notification, evicting the oldest one when the queue is full.
    pub fn show(
        &mut self,
        text: impl Into<String>,
        kind: NotificationKind,
        presentation: Presentation,
        now: Instant,
    ) -> NotificationId {
        let text = text.into();
        self.prune(now);

        while self.items.len() >= self.capacity {
            if let Some(evicted) = self.items.pop_front() {
                tracing::debug!(id = %evicted.id, "evicted oldest notification");
            }
        }

        let id = NotificationId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, ?kind, ?presentation, text = %text, "notification");
        self.items.push_back(Notification {
            id,
            text,
            kind,
            presentation,
            created_at: now,
        });
        id
    }

    pub fn alert(
        &mut self,
        text: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> NotificationId {
        self.show(text, kind, Presentation::Alert, now)
    }

    pub fn toast(
        &mut self,
        text: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> NotificationId {
        self.show(text, kind, Presentation::Toast, now)
    }

    /// Like [`alert`](Self::alert), but returns `None` while an identical alert
    /// is still on screen and not yet fading. Meant for per-keystroke warnings.
    pub fn alert_once(
        &mut self,
        text: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> Option<NotificationId> {
        let text = text.into();
        self.prune(now);

        let on_screen = self.items.iter().any(|existing| {
            existing.kind == kind
                && existing.presentation == Presentation::Alert
                && existing.text == text
                && matches!(
                    self.timing.phase_at(Presentation::Alert, existing.age(now)),
                    Some(NotificationPhase::Entering | NotificationPhase::Shown)
                )
        });
        if on_screen {
            tracing::debug!(?kind, text = %text, "alert already on screen");
            return None;
        }
        Some(self.alert(text, kind, now))
    }

    pub fn prune(&mut self, now: Instant) {
        let timing = self.timing;
        self.items
            .retain(|item| timing.phase_at(item.presentation, item.age(now)).is_some());
    }

    pub fn visible(&self, now: Instant) -> impl Iterator<Item = VisibleNotification<'_>> + '_ {
        self.items.iter().filter_map(move |notification| {
            let age = notification.age(now);
            let phase = self.timing.phase_at(notification.presentation, age)?;
            Some(VisibleNotification {
                notification,
                phase,
                opacity: self.timing.opacity_at(notification.presentation, age),
            })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
