use futures::Stream;

use crate::core::broadcast::Subscription;

/// Subscriber that pulls in fixed-size batches: it grants `batch` items up
/// front and grants the next batch only once the previous one was consumed.
pub struct DemandConsumer<T> {
    subscription: Subscription<T>,
    batch: u64,
    remaining: u64,
    granted: u64,
    consumed: u64,
}

impl<T> DemandConsumer<T> {
    pub fn new(subscription: Subscription<T>, batch: u64) -> Self {
        let batch = batch.max(1);
        subscription.request(batch);
        Self {
            subscription,
            batch,
            remaining: batch,
            granted: batch,
            consumed: 0,
        }
    }

    pub async fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            self.subscription.request(self.batch);
            self.remaining = self.batch;
            self.granted = self.granted.saturating_add(self.batch);
        }

        let item = self.subscription.next().await?;
        self.remaining -= 1;
        self.consumed += 1;
        Some(item)
    }

    /// Total demand granted so far.
    pub fn granted(&self) -> u64 {
        self.granted
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn into_stream(self) -> impl Stream<Item = T>
    where
        T: Send,
    {
        futures::stream::unfold(self, |mut consumer| async move {
            let item = consumer.next().await?;
            Some((item, consumer))
        })
    }
}
