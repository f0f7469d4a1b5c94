use chrono::{DateTime, NaiveDate, Utc};
use gramstay_shared::ListingSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    #[default]
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Forward along pending → confirmed → completed, or to cancelled from a live state
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A stay reserved by the traveller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "booking_dates"))]
pub struct Booking {
    #[validate(length(min = 1, message = "booking id is required"))]
    pub id: String,
    #[validate(nested)]
    pub listing_snapshot: ListingSnapshot,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "at least one guest is required"))]
    pub guests_count: u32,
    #[validate(range(min = 0.0, message = "total price cannot be negative"))]
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Input to `BookingManager::add_booking`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "new_booking_dates"))]
pub struct NewBooking {
    #[validate(nested)]
    pub listing_snapshot: ListingSnapshot,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "at least one guest is required"))]
    pub guests_count: u32,
    #[validate(range(min = 0.0, message = "total price cannot be negative"))]
    pub total_price: f64,
    /// Defaults to confirmed
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

fn stay_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ValidationError> {
    if check_out < check_in {
        let mut err = ValidationError::new("stay_dates");
        err.message = Some("check-out cannot be before check-in".into());
        return Err(err);
    }
    Ok(())
}

fn booking_dates(booking: &Booking) -> Result<(), ValidationError> {
    stay_dates(booking.check_in, booking.check_out)
}

fn new_booking_dates(input: &NewBooking) -> Result<(), ValidationError> {
    stay_dates(input.check_in, input.check_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_only_move_forward() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        for terminal in [Cancelled, Completed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Confirmed, Cancelled, Completed] {
                assert!(!terminal.can_transition_to(next), "{} -> {}", terminal, next);
            }
        }
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_booking_wire_shape() {
        let booking: Booking = serde_json::from_str(
            r#"{
                "id": "b-1",
                "listingSnapshot": {"id": "manali-valley", "title": "Manali Valley Homestay",
                                    "images": ["manali/1.jpg"], "location": "Himachal Pradesh"},
                "checkIn": "2024-03-10",
                "checkOut": "2024-03-12",
                "guestsCount": 2,
                "totalPrice": 5400,
                "status": "confirmed",
                "createdAt": "2024-02-20T08:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.nights(), 2);
        assert!(booking.validate().is_ok());
    }

    #[test]
    fn test_reversed_dates_fail_validation() {
        let input: NewBooking = serde_json::from_str(
            r#"{
                "listingSnapshot": {"id": "coorg-estate", "title": "Coorg Coffee Estate"},
                "checkIn": "2024-03-12",
                "checkOut": "2024-03-10",
                "guestsCount": 2,
                "totalPrice": 5400
            }"#,
        )
        .unwrap();

        assert!(input.status.is_none());
        assert!(input.validate().is_err());
    }
}
