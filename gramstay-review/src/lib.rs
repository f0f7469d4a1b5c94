pub mod models;
pub mod manager;

pub use models::{NewReview, RatingSummary, Review};
pub use manager::{ReviewManager, STORAGE_KEY};
