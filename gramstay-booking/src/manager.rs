use crate::models::{Booking, BookingStatus, NewBooking};
use crate::views::{self, BookingStats};
use gramstay_core::{new_id, validation, Clock, CoreError, CoreResult};
use gramstay_shared::StateEvent;
use gramstay_store::PersistentMirror;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub const STORAGE_KEY: &str = "bookings";

/// Manages the booking collection and its status lifecycle
pub struct BookingManager {
    bookings: Vec<Booking>,
    mirror: PersistentMirror,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<StateEvent>,
}

impl BookingManager {
    pub fn new(mirror: PersistentMirror, clock: Arc<dyn Clock>, channel_capacity: usize) -> Self {
        let stored: Vec<Booking> = mirror.load_or_default(STORAGE_KEY);
        let (events, _) = broadcast::channel(channel_capacity.max(1));

        // Ids must stay unique; keep the first record seen for an id
        let mut seen = HashSet::new();
        let bookings: Vec<Booking> = stored
            .into_iter()
            .filter(|b| {
                let fresh = seen.insert(b.id.clone());
                if !fresh {
                    warn!("Dropping stored booking with duplicate id {}", b.id);
                }
                fresh
            })
            .collect();

        debug!("Hydrated {} bookings", bookings.len());
        Self {
            bookings,
            mirror,
            clock,
            events,
        }
    }

    /// Publish change events on a channel shared with other containers
    pub fn with_events(mut self, events: broadcast::Sender<StateEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Create a booking; confirmed unless the input asks for pending
    pub fn add_booking(&mut self, input: NewBooking) -> CoreResult<Booking> {
        validation::check(&input)?;
        validation::require_non_blank("listingSnapshot.id", &input.listing_snapshot.id)?;
        validation::require_non_blank("listingSnapshot.title", &input.listing_snapshot.title)?;
        if !input.total_price.is_finite() {
            return Err(CoreError::ValidationError(
                "totalPrice: must be a finite amount".to_string(),
            ));
        }

        let status = input.status.unwrap_or_default();
        if status.is_terminal() {
            return Err(CoreError::ValidationError(format!(
                "status: a booking cannot start as {}",
                status
            )));
        }

        let booking = Booking {
            id: new_id(),
            listing_snapshot: input.listing_snapshot,
            check_in: input.check_in,
            check_out: input.check_out,
            guests_count: input.guests_count,
            total_price: input.total_price,
            status,
            created_at: self.clock.now(),
        };

        info!(
            "Booking {} created for listing {} ({})",
            booking.id, booking.listing_snapshot.id, booking.status
        );
        self.bookings.push(booking.clone());
        self.commit();
        Ok(booking)
    }

    pub fn get_booking(&self, booking_id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == booking_id)
    }

    /// All bookings in insertion order
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn bookings_for_listing(&self, listing_id: &str) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.listing_snapshot.id == listing_id)
            .collect()
    }

    /// Transition: Pending → Confirmed
    pub fn confirm_booking(&mut self, booking_id: &str) -> CoreResult<Booking> {
        self.transition(booking_id, BookingStatus::Confirmed)
    }

    /// Transition: Confirmed → Completed
    pub fn complete_booking(&mut self, booking_id: &str) -> CoreResult<Booking> {
        self.transition(booking_id, BookingStatus::Completed)
    }

    /// Cancel a pending or confirmed booking. Cancelling twice is a no-op.
    pub fn cancel_booking(&mut self, booking_id: &str) -> CoreResult<Booking> {
        let booking = self.get_booking_mut(booking_id)?;
        if booking.status == BookingStatus::Cancelled {
            debug!("Booking {} already cancelled", booking_id);
            return Ok(booking.clone());
        }
        self.transition(booking_id, BookingStatus::Cancelled)
    }

    /// Remove a booking outright, whatever its status
    pub fn delete_booking(&mut self, booking_id: &str) -> CoreResult<Booking> {
        let index = self
            .bookings
            .iter()
            .position(|b| b.id == booking_id)
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))?;

        let removed = self.bookings.remove(index);
        info!("Booking {} deleted", booking_id);
        self.commit();
        Ok(removed)
    }

    pub fn upcoming_bookings(&self) -> Vec<&Booking> {
        views::upcoming(&self.bookings, self.clock.today())
    }

    pub fn completed_bookings(&self) -> Vec<&Booking> {
        views::completed(&self.bookings, self.clock.today())
    }

    pub fn cancelled_bookings(&self) -> Vec<&Booking> {
        views::cancelled(&self.bookings)
    }

    pub fn recent_bookings(&self, limit: usize) -> Vec<&Booking> {
        views::recent(&self.bookings, limit)
    }

    pub fn stats(&self) -> BookingStats {
        BookingStats::collect(&self.bookings, self.clock.today())
    }

    fn transition(&mut self, booking_id: &str, to: BookingStatus) -> CoreResult<Booking> {
        let booking = self.get_booking_mut(booking_id)?;

        if !booking.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                from: booking.status.to_string(),
                to: to.to_string(),
            });
        }

        booking.status = to;
        let updated = booking.clone();
        info!("Booking {} is now {}", booking_id, to);
        self.commit();
        Ok(updated)
    }

    /// Helper to get mutable booking reference
    fn get_booking_mut(&mut self, booking_id: &str) -> CoreResult<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))
    }

    fn commit(&self) {
        self.mirror.save(STORAGE_KEY, &self.bookings);
        let _ = self.events.send(StateEvent::BookingsChanged {
            total: self.bookings.len(),
            upcoming: self.upcoming_bookings().len(),
            timestamp: self.clock.now().timestamp(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gramstay_core::{FixedClock, StorageBackend};
    use gramstay_shared::ListingSnapshot;
    use gramstay_store::MemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manager_on(today: NaiveDate, storage: Arc<MemoryStorage>) -> BookingManager {
        BookingManager::new(
            PersistentMirror::new(storage, "gramstay"),
            Arc::new(FixedClock::on(today)),
            16,
        )
    }

    fn manali_stay() -> NewBooking {
        NewBooking {
            listing_snapshot: ListingSnapshot::new("manali-valley", "Manali Valley Homestay", "Himachal Pradesh")
                .with_images(vec!["manali/cover.jpg".to_string()]),
            check_in: date(2024, 3, 10),
            check_out: date(2024, 3, 12),
            guests_count: 2,
            total_price: 5400.0,
            status: Some(BookingStatus::Confirmed),
        }
    }

    #[test]
    fn test_add_booking_scenario() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));

        let booking = manager.add_booking(manali_stay()).unwrap();

        assert!(!booking.id.is_empty());
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(manager.upcoming_bookings().len(), 1);
        assert_eq!(manager.upcoming_bookings()[0].id, booking.id);
    }

    #[test]
    fn test_past_confirmed_booking_reads_as_completed() {
        let mut manager = manager_on(date(2024, 3, 20), Arc::new(MemoryStorage::new()));

        let booking = manager.add_booking(manali_stay()).unwrap();

        assert!(manager.upcoming_bookings().is_empty());
        assert_eq!(manager.completed_bookings()[0].id, booking.id);
        // Inference only; stored status is unchanged
        assert_eq!(manager.get_booking(&booking.id).unwrap().status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_status_defaults_to_confirmed() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));

        let booking = manager.add_booking(NewBooking { status: None, ..manali_stay() }).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_mutation() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = manager_on(date(2024, 3, 1), storage.clone());

        let invalid = [
            NewBooking { guests_count: 0, ..manali_stay() },
            NewBooking { total_price: -1.0, ..manali_stay() },
            NewBooking { total_price: f64::NAN, ..manali_stay() },
            NewBooking { check_out: date(2024, 3, 9), ..manali_stay() },
            NewBooking { status: Some(BookingStatus::Cancelled), ..manali_stay() },
            NewBooking {
                listing_snapshot: ListingSnapshot::new(" ", "Manali Valley Homestay", ""),
                ..manali_stay()
            },
        ];
        for input in invalid {
            assert!(manager.add_booking(input).unwrap_err().is_validation());
        }

        assert!(manager.bookings().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_cancel_missing_booking_reports_not_found() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));
        manager.add_booking(manali_stay()).unwrap();

        let err = manager.cancel_booking("nonexistent-id").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(manager.bookings().len(), 1);
        assert_eq!(manager.bookings()[0].status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_cancel_is_noop_when_already_cancelled() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));
        let id = manager.add_booking(manali_stay()).unwrap().id;
        let mut rx = manager.subscribe();

        manager.cancel_booking(&id).unwrap();
        let again = manager.cancel_booking(&id).unwrap();

        assert_eq!(again.status, BookingStatus::Cancelled);
        assert!(rx.try_recv().is_ok());
        // Second cancel neither writes nor notifies
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_terminal_statuses_never_move_back() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));
        let cancelled = manager.add_booking(manali_stay()).unwrap().id;
        let completed = manager.add_booking(manali_stay()).unwrap().id;

        manager.cancel_booking(&cancelled).unwrap();
        manager.complete_booking(&completed).unwrap();

        for id in [&cancelled, &completed] {
            let before = manager.get_booking(id).unwrap().status;
            let _ = manager.confirm_booking(id);
            let _ = manager.complete_booking(id);
            let _ = manager.cancel_booking(id);
            assert_eq!(manager.get_booking(id).unwrap().status, before);
        }

        let err = manager.cancel_booking(&completed).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_pending_booking_lifecycle() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));
        let id = manager
            .add_booking(NewBooking { status: Some(BookingStatus::Pending), ..manali_stay() })
            .unwrap()
            .id;

        // Pending stays are not upcoming yet
        assert!(manager.upcoming_bookings().is_empty());
        assert!(manager.complete_booking(&id).is_err());

        manager.confirm_booking(&id).unwrap();
        assert_eq!(manager.upcoming_bookings().len(), 1);

        manager.complete_booking(&id).unwrap();
        assert_eq!(manager.completed_bookings().len(), 1);
    }

    #[test]
    fn test_delete_is_distinct_from_cancel() {
        let mut manager = manager_on(date(2024, 3, 1), Arc::new(MemoryStorage::new()));
        let id = manager.add_booking(manali_stay()).unwrap().id;
        manager.cancel_booking(&id).unwrap();

        assert_eq!(manager.cancelled_bookings().len(), 1);
        let removed = manager.delete_booking(&id).unwrap();

        assert_eq!(removed.status, BookingStatus::Cancelled);
        assert!(manager.bookings().is_empty());
        assert!(manager.delete_booking(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_bookings_survive_rehydration() {
        let storage = Arc::new(MemoryStorage::new());
        let (first, second) = {
            let mut manager = manager_on(date(2024, 3, 1), storage.clone());
            let first = manager.add_booking(manali_stay()).unwrap();
            let second = manager.add_booking(manali_stay()).unwrap();
            manager.cancel_booking(&second.id).unwrap();
            (first, second)
        };

        let manager = manager_on(date(2024, 3, 1), storage);
        let ids: Vec<&str> = manager.bookings().iter().map(|b| b.id.as_str()).collect();

        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
        assert_eq!(manager.get_booking(&first.id).unwrap(), &first);
        assert_eq!(manager.get_booking(&second.id).unwrap().status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_invalid_stored_bookings_hydrate_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                "gramstay:bookings",
                r#"[{"id":"b-1","listingSnapshot":{"id":"manali-valley","title":"Manali"},
                    "checkIn":"2024-03-10","checkOut":"2024-03-12","guestsCount":0,
                    "totalPrice":5400,"status":"confirmed","createdAt":"2024-02-20T08:30:00Z"}]"#,
            )
            .unwrap();

        let manager = manager_on(date(2024, 3, 1), storage);
        assert!(manager.bookings().is_empty());
    }

    #[test]
    fn test_duplicate_stored_ids_are_dropped() {
        let storage = Arc::new(MemoryStorage::new());
        let record = r#"{"id":"b-1","listingSnapshot":{"id":"manali-valley","title":"Manali"},
            "checkIn":"2024-03-10","checkOut":"2024-03-12","guestsCount":2,
            "totalPrice":5400,"status":"confirmed","createdAt":"2024-02-20T08:30:00Z"}"#;
        storage.set("gramstay:bookings", &format!("[{},{}]", record, record)).unwrap();

        let manager = manager_on(date(2024, 3, 1), storage);
        assert_eq!(manager.bookings().len(), 1);
    }

    #[test]
    fn test_recent_bookings_and_stats() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = manager_on(date(2024, 3, 1), storage);
        let first = manager.add_booking(manali_stay()).unwrap();
        let second = manager.add_booking(NewBooking { total_price: 1200.0, ..manali_stay() }).unwrap();
        manager.cancel_booking(&second.id).unwrap();

        // Same fixed timestamp, so both are returned; order among equals is stable
        assert_eq!(manager.recent_bookings(5).len(), 2);
        assert_eq!(manager.bookings_for_listing("manali-valley").len(), 2);

        let stats = manager.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total_spent, first.total_price);
    }
}
