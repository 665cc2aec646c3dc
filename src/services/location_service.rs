use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::models::UserLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl LocationOptions {
    /// "My Location" / "Find nearby": accept a fix up to 5 minutes old.
    pub fn one_shot() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(300),
        }
    }

    pub fn watch() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(10),
        }
    }
}

/// Geolocation failure outcomes. Messages are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationError {
    #[error("Unable to retrieve your location. Please allow location access.")]
    PermissionDenied,
    #[error("Unable to retrieve your location. Location information is unavailable.")]
    PositionUnavailable,
    #[error("Unable to retrieve your location. Location request timed out.")]
    Timeout,
    #[error("Unable to retrieve your location. An unknown error occurred.")]
    #[serde(other)]
    Unknown,
}

impl LocationError {
    /// Maps a browser `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Unknown,
        }
    }
}

pub type LocationUpdate = Result<UserLocation, LocationError>;

type UpdateStream = Pin<Box<dyn Stream<Item = LocationUpdate> + Send>>;

/// Ends a watch. Dropping it ends the watch as well.
#[derive(Debug)]
pub struct WatchCancel(watch::Sender<bool>);

impl WatchCancel {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// A continuous series of location updates that stops on cancellation.
pub struct LocationSubscription {
    updates: UpdateStream,
    cancelled: watch::Receiver<bool>,
    timeout: Duration,
}

impl LocationSubscription {
    pub fn new<S>(updates: S, timeout: Duration) -> (Self, WatchCancel)
    where
        S: Stream<Item = LocationUpdate> + Send + 'static,
    {
        let (tx, rx) = watch::channel(false);
        let sub = Self {
            updates: Box::pin(updates),
            cancelled: rx,
            timeout,
        };
        (sub, WatchCancel(tx))
    }

    /// Next update, `Some(Err(Timeout))` if nothing arrived within the
    /// timeout, `None` once cancelled or the source is gone.
    pub async fn next(&mut self) -> Option<LocationUpdate> {
        if *self.cancelled.borrow() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled.changed() => None,
            item = tokio::time::timeout(self.timeout, self.updates.next()) => match item {
                Ok(item) => item,
                Err(_) => Some(Err(LocationError::Timeout)),
            },
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn get_once(&self, options: LocationOptions) -> LocationUpdate;

    fn watch(&self, options: LocationOptions) -> (LocationSubscription, WatchCancel);
}

#[derive(Debug, Clone, Copy)]
struct Reading {
    seq: u64,
    received_at: Instant,
    outcome: LocationUpdate,
}

/// Location provider fed by the browser: the page forwards each
/// `navigator.geolocation` result to the server.
pub struct ClientLocationProvider {
    /// Latest reading only, for one-shot requests.
    readings: watch::Sender<Option<Reading>>,
    /// Every reading, in order, for running watches.
    updates: broadcast::Sender<LocationUpdate>,
    seq: AtomicU64,
}

/// Readings a slow watcher may fall behind by before it starts losing them.
const WATCH_BUFFER: usize = 64;

impl Default for ClientLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientLocationProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        let (updates, _) = broadcast::channel(WATCH_BUFFER);
        Self {
            readings: tx,
            updates,
            seq: AtomicU64::new(0),
        }
    }

    pub fn push_fix(&self, location: UserLocation) -> u64 {
        self.push(Ok(location))
    }

    pub fn push_error(&self, error: LocationError) -> u64 {
        self.push(Err(error))
    }

    fn push(&self, outcome: LocationUpdate) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("📍 Client reading #{}: {:?}", seq, outcome);
        self.readings.send_replace(Some(Reading {
            seq,
            received_at: Instant::now(),
            outcome,
        }));
        // no running watch is fine
        let _ = self.updates.send(outcome);
        seq
    }

    /// Sequence number of the most recent reading, 0 if none yet.
    pub fn last_seq(&self) -> u64 {
        self.readings.borrow().map(|r| r.seq).unwrap_or(0)
    }
}

#[async_trait]
impl LocationProvider for ClientLocationProvider {
    async fn get_once(&self, options: LocationOptions) -> LocationUpdate {
        let mut rx = self.readings.subscribe();

        let cached = *rx.borrow_and_update();
        if let Some(Reading {
            outcome: Ok(location),
            received_at,
            ..
        }) = cached
        {
            if received_at.elapsed() <= options.max_age {
                return Ok(location);
            }
        }

        match tokio::time::timeout(options.timeout, rx.changed()).await {
            Ok(Ok(())) => {
                let reading = *rx.borrow_and_update();
                reading
                    .map(|r| r.outcome)
                    .unwrap_or(Err(LocationError::Unknown))
            }
            Ok(Err(_)) => Err(LocationError::PositionUnavailable),
            Err(_) => Err(LocationError::Timeout),
        }
    }

    fn watch(&self, options: LocationOptions) -> (LocationSubscription, WatchCancel) {
        let updates =
            BroadcastStream::new(self.updates.subscribe()).filter_map(|update| match update {
                Ok(update) => Some(update),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!("📍 Watch fell behind, {} reading(s) skipped", missed);
                    None
                }
            });
        LocationSubscription::new(updates, options.timeout)
    }
}
