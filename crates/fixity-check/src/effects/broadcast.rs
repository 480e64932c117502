use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::data::FixityCheckEvent;

/// Publishes [`FixityCheckEvent`]s to named topics.
///
/// Publishing is fire-and-forget: a topic nobody listens to is not an error.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, topic: &str, event: &FixityCheckEvent);
}

impl<B: Broadcaster + ?Sized> Broadcaster for Arc<B> {
    fn publish(&self, topic: &str, event: &FixityCheckEvent) { (**self).publish(topic, event) }
}

/// In-process pub/sub over tokio broadcast channels, one per topic.
///
/// Subscribers receive each event as its JSON payload. A topic is released
/// after its terminal event or once it has no receivers left; receivers
/// still drain what was buffered before the release.
#[derive(Debug)]
pub struct ChannelBroadcaster {
    capacity: usize,
    topics:   Mutex<HashMap<String, broadcast::Sender<Arc<str>>>>,
}

impl ChannelBroadcaster {
    pub const DEFAULT_CAPACITY: usize = 64;

    /// `capacity` bounds how many events a slow subscriber may lag behind
    /// before it starts missing them.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics:   Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Arc<str>> {
        let mut topics = self.lock();
        topics.retain(|_, sender| sender.receiver_count() > 0);
        match topics.get(topic) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(self.capacity);
                topics.insert(topic.to_string(), sender);
                receiver
            }
        }
    }

    /// Drop the topic if nobody is listening on it anymore.
    ///
    /// Receivers are unsubscribed by dropping them; this only releases the
    /// topic's bookkeeping. Returns `true` if the topic was removed.
    pub fn unsubscribe(&self, topic: &str) -> bool {
        let mut topics = self.lock();
        let idle = topics.get(topic).is_some_and(|s| s.receiver_count() == 0);
        if idle {
            topics.remove(topic);
        }
        idle
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock().get(topic).map_or(0, |s| s.receiver_count())
    }

    /// Number of topics currently held open.
    pub fn topic_count(&self) -> usize { self.lock().len() }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Arc<str>>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, topic: &str, event: &FixityCheckEvent) {
        let payload: Arc<str> = match event.to_json() {
            Ok(json) => json.into(),
            Err(err) => {
                tracing::warn!(%err, topic, "failed to encode fixity check event");
                return;
            }
        };

        let mut topics = self.lock();
        let Some(sender) = topics.get(topic) else {
            tracing::trace!(topic, "no subscribers");
            return;
        };
        let delivered = sender.send(payload).is_ok();
        if !delivered {
            tracing::trace!(topic, "all subscribers gone");
        }
        if !delivered || event.is_terminal() {
            topics.remove(topic);
        }
    }
}

/// Writes events to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBroadcaster;

impl Broadcaster for TracingBroadcaster {
    fn publish(&self, topic: &str, event: &FixityCheckEvent) {
        match event.to_json() {
            Ok(payload) => tracing::info!(topic, %payload, "fixity check event"),
            Err(err) => tracing::warn!(%err, topic, "failed to encode fixity check event"),
        }
    }
}
