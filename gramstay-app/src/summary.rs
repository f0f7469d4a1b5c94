use chrono::{DateTime, Utc};
use gramstay_booking::{BookingStats, BookingStatus};
use gramstay_review::RatingSummary;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedCounts {
    pub listings: usize,
    pub experiences: usize,
    pub plans: usize,
    pub total: usize,
}

/// Everything the traveller dashboard shows at a glance
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub saved: SavedCounts,
    pub bookings: BookingStats,
    pub reviews: RatingSummary,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn collect(state: &AppState) -> Self {
        let saved = &state.saved;
        Self {
            saved: SavedCounts {
                listings: saved.saved_listing_ids().len(),
                experiences: saved.saved_experience_ids().len(),
                plans: saved.saved_plan_ids().len(),
                total: saved.total_saved(),
            },
            bookings: state.bookings.stats(),
            reviews: state.reviews.rating_summary(None),
            generated_at: state.clock.now(),
        }
    }
}

/// Host view of a single listing
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub listing_id: String,
    pub saved: bool,
    /// Thumbnail from the newest booking snapshot that has one
    pub cover_image: Option<String>,
    pub bookings: usize,
    pub active_bookings: usize,
    /// Sum over bookings that are not cancelled
    pub revenue: f64,
    pub nights_booked: i64,
    pub rating: RatingSummary,
}

impl ListingSummary {
    pub fn collect(state: &AppState, listing_id: &str) -> Self {
        let bookings = state.bookings.bookings_for_listing(listing_id);
        let live: Vec<_> = bookings
            .iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .collect();

        Self {
            listing_id: listing_id.to_string(),
            saved: state.saved.is_listing_saved(listing_id),
            cover_image: bookings
                .iter()
                .rev()
                .find_map(|b| b.listing_snapshot.cover_image())
                .map(str::to_string),
            bookings: bookings.len(),
            active_bookings: live
                .iter()
                .filter(|b| matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed))
                .count(),
            revenue: live.iter().map(|b| b.total_price).sum(),
            nights_booked: live.iter().map(|b| b.nights()).sum(),
            rating: state.reviews.rating_summary(Some(listing_id)),
        }
    }
}
