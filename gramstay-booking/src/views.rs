//! Read-time partitions over the booking collection.
//!
//! Every function here is pure over the records and the reference date;
//! nothing is cached between calls.

use crate::models::{Booking, BookingStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Confirmed stays that have not started yet
pub fn upcoming<'a>(bookings: &'a [Booking], today: NaiveDate) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed && b.check_in >= today)
        .collect()
}

/// Completed stays, including confirmed ones whose check-out has passed.
///
/// The past-dated case is a display inference only; the stored status stays
/// `confirmed` until `complete_booking` is called.
pub fn completed<'a>(bookings: &'a [Booking], today: NaiveDate) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| is_completed(b, today))
        .collect()
}

pub fn cancelled(bookings: &[Booking]) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Cancelled)
        .collect()
}

/// Newest first by creation time
pub fn recent(bookings: &[Booking], limit: usize) -> Vec<&Booking> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

fn is_completed(booking: &Booking, today: NaiveDate) -> bool {
    booking.status == BookingStatus::Completed
        || (booking.status == BookingStatus::Confirmed && booking.check_out < today)
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Sum of `total_price` over bookings that are not cancelled
    pub total_spent: f64,
}

impl BookingStats {
    pub fn collect(bookings: &[Booking], today: NaiveDate) -> Self {
        Self {
            total: bookings.len(),
            pending: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending)
                .count(),
            upcoming: upcoming(bookings, today).len(),
            completed: completed(bookings, today).len(),
            cancelled: cancelled(bookings).len(),
            total_spent: bookings
                .iter()
                .filter(|b| b.status != BookingStatus::Cancelled)
                .map(|b| b.total_price)
                .sum(),
        }
    }
}
