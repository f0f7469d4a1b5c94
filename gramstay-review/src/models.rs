use chrono::{DateTime, Utc};
use gramstay_core::validation::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[validate(length(min = 1, message = "review id is required"))]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    pub listing_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub helpful_count: u32,
}

/// Input to `ReviewManager::add_review`.
///
/// `rating` is signed so out-of-range input reaches validation instead of
/// failing to deserialize.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(length(min = 1, message = "listing id is required"))]
    pub listing_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(min = 1, message = "review content is required"))]
    pub content: String,
}

/// Rating aggregate over a set of reviews
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    pub average: Option<f64>,
    /// Index 0 counts one-star reviews, index 4 five-star ones
    pub breakdown: [usize; 5],
}

impl RatingSummary {
    pub fn collect<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut summary = Self::default();
        let mut sum = 0u64;

        for review in reviews {
            let rating = review.rating.clamp(MIN_RATING, MAX_RATING);
            summary.breakdown[usize::from(rating - MIN_RATING)] += 1;
            summary.count += 1;
            sum += u64::from(rating);
        }

        if summary.count > 0 {
            summary.average = Some(sum as f64 / summary.count as f64);
        }
        summary
    }
}
