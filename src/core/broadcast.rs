//! Multicast, replay-buffered broadcast with pull-based flow control.
//!
//! A [`BroadcastStream`] owns its history and subscriber table behind a single
//! monitor. Publishing never waits on subscribers: every subscriber has its own
//! demand counter and FIFO backlog, and items move from the backlog to the
//! subscriber's receive queue only while it has outstanding demand.
//!
//! ```text
//!   publish(item) ──► history (retention) ──► per-subscriber backlog
//!                                                   │  demand > 0
//!                                                   ▼
//!                                         Subscription::next()
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// How much publish history a new subscriber gets replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Retention {
    /// Every item published so far.
    #[default]
    ReplayAll,
    /// Only the most recently published item.
    ReplayLatest,
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retention::ReplayAll => write!(f, "replay-all"),
            Retention::ReplayLatest => write!(f, "replay-latest"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct SubscriberSlot<T> {
    demand: u64,
    backlog: VecDeque<T>,
    sender: mpsc::UnboundedSender<T>,
}

impl<T> SubscriberSlot<T> {
    /// Moves backlog items to the receive queue while demand lasts. Returns
    /// false once the receiving side is gone.
    fn drain(&mut self) -> bool {
        while self.demand > 0 {
            let Some(item) = self.backlog.pop_front() else {
                break;
            };
            if self.sender.send(item).is_err() {
                return false;
            }
            self.demand -= 1;
        }
        true
    }
}

struct BroadcastState<T> {
    retention: Retention,
    history: VecDeque<T>,
    subscribers: HashMap<SubscriptionId, SubscriberSlot<T>>,
    next_id: u64,
}

impl<T: Clone> BroadcastState<T> {
    fn retain(&mut self, item: &T) {
        if self.retention == Retention::ReplayLatest {
            self.history.clear();
        }
        self.history.push_back(item.clone());
    }
}

/// Shared handle to one broadcast stream. Cloning the handle shares the
/// stream; there is no lock spanning separate streams.
pub struct BroadcastStream<T> {
    state: Arc<Mutex<BroadcastState<T>>>,
}

impl<T> Clone for BroadcastStream<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock<T>(state: &Mutex<BroadcastState<T>>) -> MutexGuard<'_, BroadcastState<T>> {
    // The state is left consistent after every operation, so a poisoned lock
    // is still usable.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: Clone + Send + 'static> BroadcastStream<T> {
    pub fn new(retention: Retention) -> Self {
        Self {
            state: Arc::new(Mutex::new(BroadcastState {
                retention,
                history: VecDeque::new(),
                subscribers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    pub fn retention(&self) -> Retention {
        lock(&self.state).retention
    }

    /// Appends `item` to the history and offers it to every subscriber.
    /// Subscribers without demand keep it in their backlog.
    pub fn publish(&self, item: T) {
        let mut state = lock(&self.state);
        state.retain(&item);

        let mut closed = Vec::new();
        for (id, slot) in state.subscribers.iter_mut() {
            slot.backlog.push_back(item.clone());
            if !slot.drain() {
                closed.push(*id);
            }
        }
        for id in closed {
            debug!("Dropping subscriber {:?} with closed receiver", id);
            state.subscribers.remove(&id);
        }

        trace!(
            "Published item to {} subscribers (history: {})",
            state.subscribers.len(),
            state.history.len()
        );
    }

    /// Registers a subscriber with zero demand. The retained history is
    /// queued ahead of any live item.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut state = lock(&self.state);
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;

        let (sender, receiver) = mpsc::unbounded_channel();
        let backlog = state.history.iter().cloned().collect::<VecDeque<_>>();
        debug!(
            "Subscriber {:?} joined, {} items queued for replay ({})",
            id,
            backlog.len(),
            state.retention
        );
        state.subscribers.insert(
            id,
            SubscriberSlot {
                demand: 0,
                backlog,
                sender,
            },
        );

        Subscription {
            id,
            receiver,
            stream: Arc::downgrade(&self.state),
        }
    }

    /// Grants `n` more items to a subscriber and delivers what its backlog
    /// holds up to the new demand. Returns false for unknown subscribers.
    pub fn request_more(&self, id: SubscriptionId, n: u64) -> bool {
        request_more(&self.state, id, n)
    }

    /// Unregisters a subscriber. History and other subscribers are untouched.
    pub fn cancel(&self, id: SubscriptionId) -> bool {
        cancel(&self.state, id)
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    pub fn history_len(&self) -> usize {
        lock(&self.state).history.len()
    }
}

fn request_more<T>(state: &Mutex<BroadcastState<T>>, id: SubscriptionId, n: u64) -> bool {
    let mut state = lock(state);
    let Some(slot) = state.subscribers.get_mut(&id) else {
        return false;
    };
    slot.demand = slot.demand.saturating_add(n);
    if !slot.drain() {
        state.subscribers.remove(&id);
        return false;
    }
    true
}

fn cancel<T>(state: &Mutex<BroadcastState<T>>, id: SubscriptionId) -> bool {
    let removed = lock(state).subscribers.remove(&id).is_some();
    if removed {
        debug!("Subscriber {:?} cancelled", id);
    }
    removed
}

/// Receiving side of one subscriber. Nothing is delivered until demand is
/// granted with [`Subscription::request`]. Dropping the handle cancels it.
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<T>,
    stream: Weak<Mutex<BroadcastState<T>>>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn request(&self, n: u64) -> bool {
        match self.stream.upgrade() {
            Some(state) => request_more(&state, self.id, n),
            None => false,
        }
    }

    /// Next delivered item. Returns `None` once the subscription is
    /// cancelled or the stream is gone and everything delivered was read.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Next item already delivered, without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    pub fn cancel(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(state) = self.stream.upgrade() {
            cancel(&state, self.id);
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_recv(cx)
    }
}
