use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::entities::{Booking, Driver};
use crate::signal::changed_since_last_check;

/// Drivers and bookings as read together for one search.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub drivers: Vec<Driver>,
    pub bookings: Vec<Booking>,
}

/// Last snapshot read from the store. Dropped when the change signal fires
/// or once it is older than `ttl`, since writes from other processes never
/// reach the signal.
#[derive(Debug)]
pub struct SnapshotCache {
    receiver: broadcast::Receiver<()>,
    ttl: Duration,
    current: Option<(Instant, Arc<Snapshot>)>,
}

impl SnapshotCache {
    pub fn new(receiver: broadcast::Receiver<()>, ttl: Duration) -> Self {
        Self {
            receiver,
            ttl,
            current: None,
        }
    }

    pub fn get(&mut self) -> Option<Arc<Snapshot>> {
        if changed_since_last_check(&mut self.receiver) {
            tracing::debug!("data changed, dropping cached snapshot");
            self.current = None;
        }

        if let Some((loaded_at, _)) = &self.current {
            if loaded_at.elapsed() >= self.ttl {
                tracing::debug!("cached snapshot expired");
                self.current = None;
            }
        }

        self.current.as_ref().map(|(_, snapshot)| snapshot.clone())
    }

    pub fn put(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current = Some((Instant::now(), snapshot.clone()));
        snapshot
    }
}
