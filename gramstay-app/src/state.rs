use gramstay_booking::BookingManager;
use gramstay_core::{Clock, CoreResult, SystemClock};
use gramstay_review::ReviewManager;
use gramstay_saved::SavedItemsManager;
use gramstay_shared::StateEvent;
use gramstay_store::{Config, FileStorage, PersistentMirror};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// The three state containers, built once and passed to consumers by reference.
///
/// All containers write through the same mirror (each under its own key) and
/// publish on one shared event channel.
pub struct AppState {
    pub saved: SavedItemsManager,
    pub bookings: BookingManager,
    pub reviews: ReviewManager,
    pub clock: Arc<dyn Clock>,
    events: broadcast::Sender<StateEvent>,
}

impl AppState {
    pub fn new(mirror: PersistentMirror, clock: Arc<dyn Clock>, channel_capacity: usize) -> Self {
        let capacity = channel_capacity.max(1);
        let (events, _) = broadcast::channel(capacity);

        let saved = SavedItemsManager::new(mirror.clone(), clock.clone(), capacity)
            .with_events(events.clone());
        let bookings = BookingManager::new(mirror.clone(), clock.clone(), capacity)
            .with_events(events.clone());
        let reviews = ReviewManager::new(mirror, clock.clone(), capacity)
            .with_events(events.clone());

        Self {
            saved,
            bookings,
            reviews,
            clock,
            events,
        }
    }

    /// File-backed state as described by `config.storage`
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let storage = FileStorage::from_config(&config.storage)?;
        info!(
            "Using storage at {} (namespace {})",
            storage.root().display(),
            config.storage.namespace
        );

        let mirror = PersistentMirror::new(Arc::new(storage), config.storage.namespace.clone());
        Ok(Self::new(mirror, Arc::new(SystemClock), config.events.channel_capacity))
    }

    /// Ephemeral state for previews and tests
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(PersistentMirror::in_memory(), clock, 64)
    }

    /// Receive change events from every container
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }
}
