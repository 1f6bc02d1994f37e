use crate::navigator::ScaleState;
use crate::scale::ScaleLevel;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleEventKind {
    Start,
    Progress,
    Complete,
}

/// Transient lifecycle notification for one transition. Not retained by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleEvent {
    pub kind: ScaleEventKind,
    pub from: ScaleLevel,
    pub to: ScaleLevel,
    pub progress: Option<f32>,
    /// Engine clock in seconds.
    pub timestamp: f64,
}

impl ScaleEvent {
    pub fn start(from: ScaleLevel, to: ScaleLevel, timestamp: f64) -> Self {
        Self { kind: ScaleEventKind::Start, from, to, progress: Some(0.0), timestamp }
    }

    pub fn progress(from: ScaleLevel, to: ScaleLevel, progress: f32, timestamp: f64) -> Self {
        Self { kind: ScaleEventKind::Progress, from, to, progress: Some(progress), timestamp }
    }

    pub fn complete(from: ScaleLevel, to: ScaleLevel, timestamp: f64) -> Self {
        Self { kind: ScaleEventKind::Complete, from, to, progress: Some(1.0), timestamp }
    }
}

impl fmt::Display for ScaleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScaleEventKind::Start => write!(f, "TransitionStart {} -> {} t={:.3}", self.from, self.to, self.timestamp),
            ScaleEventKind::Progress => write!(
                f,
                "TransitionProgress {} -> {} progress={:.3} t={:.3}",
                self.from,
                self.to,
                self.progress.unwrap_or_default(),
                self.timestamp
            ),
            ScaleEventKind::Complete => {
                write!(f, "TransitionComplete {} -> {} t={:.3}", self.from, self.to, self.timestamp)
            }
        }
    }
}

/// Token returned by [`ScaleEventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type ScaleEventHandler = Box<dyn FnMut(&ScaleEvent, &ScaleState) -> Result<()> + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    label: String,
    handler: ScaleEventHandler,
}

/// Synchronous fan-out to subscribers in subscription order.
///
/// A handler that returns an error or panics is logged and skipped; the remaining
/// handlers still run and the caller never observes the failure.
#[derive(Default)]
pub struct ScaleEventChannel {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    fault_count: u64,
}

impl ScaleEventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, label: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: FnMut(&ScaleEvent, &ScaleState) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, label: label.into(), handler: Box::new(handler) });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        before != self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of handler failures isolated since creation.
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    pub fn publish(&mut self, event: &ScaleEvent, state: &ScaleState) {
        for subscriber in &mut self.subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscriber.handler)(event, state)))
                .unwrap_or_else(|payload| Err(anyhow!("handler panicked: {}", panic_message(payload.as_ref()))));
            if let Err(err) = outcome {
                self.fault_count += 1;
                log::warn!(
                    target: "scale::events",
                    "[events:{}] handler failed on {event}: {err:?}",
                    subscriber.label
                );
            }
        }
    }
}

impl fmt::Debug for ScaleEventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleEventChannel")
            .field("subscribers", &self.subscribers.iter().map(|s| s.label.as_str()).collect::<Vec<_>>())
            .field("fault_count", &self.fault_count)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::{Arc, Mutex};

    fn state() -> ScaleState {
        ScaleState::new(ScaleLevel::Human, 10)
    }

    #[test]
    fn publishes_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut channel = ScaleEventChannel::new();
        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            channel.subscribe(name, move |_, _| {
                seen.lock().unwrap().push(name);
                Ok(())
            });
        }
        channel.publish(&ScaleEvent::start(ScaleLevel::Human, ScaleLevel::Planetary, 0.0), &state());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_handlers_do_not_stop_the_fan_out() {
        let delivered = Arc::new(Mutex::new(0));
        let mut channel = ScaleEventChannel::new();
        channel.subscribe("errors", |_, _| bail!("renderer lost its surface"));
        channel.subscribe("panics", |_, _| panic!("ui widget exploded"));
        let counter = Arc::clone(&delivered);
        channel.subscribe("healthy", move |_, _| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });
        let event = ScaleEvent::progress(ScaleLevel::Human, ScaleLevel::Planetary, 0.5, 0.5);
        channel.publish(&event, &state());
        channel.publish(&event, &state());
        assert_eq!(*delivered.lock().unwrap(), 2);
        assert_eq!(channel.fault_count(), 4);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let delivered = Arc::new(Mutex::new(0));
        let mut channel = ScaleEventChannel::new();
        let counter = Arc::clone(&delivered);
        let id = channel.subscribe("counter", move |_, _| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });
        let event = ScaleEvent::complete(ScaleLevel::Human, ScaleLevel::Planetary, 1.0);
        channel.publish(&event, &state());
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id), "second unsubscribe is a no-op");
        channel.publish(&event, &state());
        assert_eq!(*delivered.lock().unwrap(), 1);
        assert!(channel.is_empty());
    }

    #[test]
    fn display_is_log_friendly() {
        let event = ScaleEvent::progress(ScaleLevel::Human, ScaleLevel::Galactic, 0.25, 1.5);
        assert_eq!(event.to_string(), "TransitionProgress human -> galactic progress=0.250 t=1.500");
    }
}
