//! Published fetch state.
//!
//! A [`WeatherStore`] owns the one "current result" slot and hands it to
//! readers through a `watch` channel. Each fetch takes a ticket; only the
//! newest ticket may publish, so a slow response to an older request never
//! overwrites a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{error::WeatherError, model::WeatherRecord, provider::WeatherProvider};

pub type Outcome = Result<WeatherRecord, WeatherError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading {
        request_id: RequestId,
        city: String,
    },
    Ready {
        request_id: RequestId,
        city: String,
        outcome: Outcome,
        completed_at: DateTime<Utc>,
    },
}

impl FetchState {
    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            FetchState::Ready { outcome: Ok(record), .. } => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            FetchState::Ready { outcome: Err(err), .. } => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }
}

#[derive(Debug)]
pub struct WeatherStore {
    latest: AtomicU64,
    tx: watch::Sender<FetchState>,
}

impl Default for WeatherStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FetchState::Idle);
        Self { latest: AtomicU64::new(0), tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FetchState {
        self.tx.borrow().clone()
    }

    /// Start a new attempt. The previous result is discarded immediately.
    pub fn begin(&self, city: &str) -> RequestId {
        let mut request_id = RequestId(0);

        // Ticket and Loading state change together under the channel lock.
        self.tx.send_modify(|state| {
            request_id = RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
            *state = FetchState::Loading { request_id, city: city.to_owned() };
        });

        request_id
    }

    /// Publish `outcome` for `request_id`. Returns false (and publishes
    /// nothing) when a newer request has started since.
    pub fn complete(&self, request_id: RequestId, outcome: Outcome) -> bool {
        let published = self.tx.send_if_modified(|state| {
            if request_id.get() != self.latest.load(Ordering::SeqCst) {
                return false;
            }

            let city = match state {
                FetchState::Loading { city, .. } | FetchState::Ready { city, .. } => {
                    std::mem::take(city)
                }
                FetchState::Idle => String::new(),
            };

            *state = FetchState::Ready { request_id, city, outcome, completed_at: Utc::now() };
            true
        });

        if !published {
            warn!(request_id = request_id.get(), "Dropping result of superseded request");
        }
        published
    }
}

/// Couples a provider with a store: the caller drives [`WeatherSession::fetch`]
/// on whatever executor it likes and readers watch the store.
#[derive(Debug, Clone)]
pub struct WeatherSession {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<WeatherStore>,
}

impl WeatherSession {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider, store: Arc::new(WeatherStore::new()) }
    }

    pub fn store(&self) -> &Arc<WeatherStore> {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.store.subscribe()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, city: &str) -> Outcome {
        let request_id = self.store.begin(city);
        debug!(request_id = request_id.get(), "Fetch started");

        let outcome = self.provider.current_weather(city).await;
        match &outcome {
            Ok(record) => info!(location = %record.name, temp = record.main.temp, "Weather received"),
            Err(err) => warn!(error = %err, "Weather request failed"),
        }

        self.store.complete(request_id, outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MainReadings;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn record(name: &str) -> WeatherRecord {
        WeatherRecord {
            name: name.to_owned(),
            main: MainReadings {
                temp: 20.0,
                feels_like: 19.0,
                temp_min: 18.0,
                temp_max: 22.0,
                pressure: 1015,
                humidity: 50,
            },
            weather: Vec::new(),
        }
    }

    #[test]
    fn starts_idle() {
        let store = WeatherStore::new();
        assert_eq!(store.current(), FetchState::Idle);
    }

    #[test]
    fn begin_discards_previous_result() {
        let store = WeatherStore::new();
        let first = store.begin("Paris");
        assert!(store.complete(first, Ok(record("Paris"))));
        assert!(store.current().record().is_some());

        store.begin("Berlin");
        let state = store.current();
        assert!(state.is_loading());
        assert!(state.record().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn stale_completion_is_dropped() {
        let store = WeatherStore::new();
        let old = store.begin("Paris");
        let new = store.begin("Berlin");

        assert!(store.complete(new, Ok(record("Berlin"))));
        assert!(!store.complete(old, Err(WeatherError::Server(500))));

        let state = store.current();
        assert_eq!(state.record().map(|r| r.name.as_str()), Some("Berlin"));
        match state {
            FetchState::Ready { request_id, city, .. } => {
                assert_eq!(request_id, new);
                assert_eq!(city, "Berlin");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn concurrent_begins_leave_newest_ticket_with_its_city() {
        let store = Arc::new(WeatherStore::new());

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..200)
                        .map(|i| {
                            let city = format!("city-{thread}-{i}");
                            (store.begin(&city), city)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let issued: Vec<(RequestId, String)> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread should not panic"))
            .collect();
        let (newest, newest_city) =
            issued.iter().max_by_key(|(id, _)| *id).expect("tickets were issued");

        assert_eq!(newest.get(), 8 * 200);
        match store.current() {
            FetchState::Loading { request_id, city } => {
                assert_eq!(request_id, *newest);
                assert_eq!(&city, newest_city);
            }
            other => panic!("unexpected state: {other:?}"),
        }

        assert!(store.complete(*newest, Err(WeatherError::NoData)));
        match store.current() {
            FetchState::Ready { city, .. } => assert_eq!(&city, newest_city),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn error_replaces_success_of_same_slot() {
        let store = WeatherStore::new();
        let id = store.begin("Atlantis");
        store.complete(id, Err(WeatherError::CityNotFound));

        assert_eq!(store.current().error(), Some(&WeatherError::CityNotFound));
        assert!(store.current().record().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_ready() {
        let store = WeatherStore::new();
        let mut rx = store.subscribe();

        let id = store.begin("Rome");
        rx.changed().await.expect("sender alive");
        assert!(rx.borrow_and_update().is_loading());

        store.complete(id, Ok(record("Rome")));
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().record().map(|r| r.name.clone()), Some("Rome".to_string()));
    }

    #[derive(Debug, Default)]
    struct GatedProvider {
        gate: Notify,
    }

    #[async_trait]
    impl WeatherProvider for GatedProvider {
        async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
            if city == "Slowtown" {
                self.gate.notified().await;
            }
            Ok(record(city))
        }
    }

    #[tokio::test]
    async fn latest_request_wins_over_slower_earlier_one() {
        let provider = Arc::new(GatedProvider::default());
        let session = WeatherSession::new(provider.clone());

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.fetch("Slowtown").await })
        };
        // Let the slow fetch take its ticket first.
        while !session.store().current().is_loading() {
            tokio::task::yield_now().await;
        }

        let fast = session.fetch("Fastville").await;
        assert!(fast.is_ok());

        provider.gate.notify_one();
        let slow = slow.await.expect("task should not panic");
        assert_eq!(slow.map(|r| r.name), Ok("Slowtown".to_string()));

        let state = session.store().current();
        assert_eq!(state.record().map(|r| r.name.as_str()), Some("Fastville"));
    }

    #[tokio::test]
    async fn validation_error_is_published() {
        #[derive(Debug)]
        struct Rejecting;

        #[async_trait]
        impl WeatherProvider for Rejecting {
            async fn current_weather(&self, _city: &str) -> Result<WeatherRecord, WeatherError> {
                Err(WeatherError::InvalidCity)
            }
        }

        let session = WeatherSession::new(Arc::new(Rejecting));
        let outcome = session.fetch("").await;

        assert_eq!(outcome, Err(WeatherError::InvalidCity));
        assert_eq!(session.store().current().error(), Some(&WeatherError::InvalidCity));
    }
}
