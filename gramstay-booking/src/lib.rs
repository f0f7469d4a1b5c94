pub mod models;
pub mod manager;
pub mod views;

pub use models::{Booking, BookingStatus, NewBooking};
pub use manager::{BookingManager, STORAGE_KEY};
pub use views::BookingStats;
