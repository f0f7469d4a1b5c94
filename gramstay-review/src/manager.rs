use crate::models::{NewReview, RatingSummary, Review};
use gramstay_core::{new_id, validation, Clock, CoreError, CoreResult};
use gramstay_shared::StateEvent;
use gramstay_store::PersistentMirror;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub const STORAGE_KEY: &str = "reviews";

/// Guest reviews across all listings.
///
/// Reviews are append-and-delete; an edit is a delete followed by a new review.
pub struct ReviewManager {
    reviews: Vec<Review>,
    mirror: PersistentMirror,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<StateEvent>,
}

impl ReviewManager {
    pub fn new(mirror: PersistentMirror, clock: Arc<dyn Clock>, channel_capacity: usize) -> Self {
        let stored: Vec<Review> = mirror.load_or_default(STORAGE_KEY);
        let (events, _) = broadcast::channel(channel_capacity.max(1));

        // Ids must stay unique; keep the first record seen for an id
        let mut seen = HashSet::new();
        let reviews: Vec<Review> = stored
            .into_iter()
            .filter(|r| {
                let fresh = seen.insert(r.id.clone());
                if !fresh {
                    warn!("Dropping stored review with duplicate id {}", r.id);
                }
                fresh
            })
            .collect();
        debug!("Hydrated {} reviews", reviews.len());

        Self {
            reviews,
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

    pub fn add_review(&mut self, input: NewReview) -> CoreResult<Review> {
        validation::check(&input)?;
        validation::require_non_blank("listingId", &input.listing_id)?;
        validation::require_non_blank("content", &input.content)?;

        let rating = u8::try_from(input.rating).map_err(|_| {
            CoreError::ValidationError("rating: must be between 1 and 5".to_string())
        })?;

        let review = Review {
            id: new_id(),
            listing_id: input.listing_id,
            author_name: input
                .author_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            rating,
            content: input.content.trim().to_string(),
            created_at: self.clock.now(),
            helpful_count: 0,
        };

        info!("Review {} added for listing {} (rating {})", review.id, review.listing_id, review.rating);
        self.reviews.push(review.clone());
        self.commit();
        Ok(review)
    }

    pub fn delete_review(&mut self, review_id: &str) -> CoreResult<Review> {
        let index = self
            .reviews
            .iter()
            .position(|r| r.id == review_id)
            .ok_or_else(|| CoreError::NotFound(format!("review {}", review_id)))?;

        let removed = self.reviews.remove(index);
        info!("Review {} deleted", review_id);
        self.commit();
        Ok(removed)
    }

    /// Count one more "helpful" vote and return the new total
    pub fn mark_helpful(&mut self, review_id: &str) -> CoreResult<u32> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or_else(|| CoreError::NotFound(format!("review {}", review_id)))?;

        review.helpful_count = review.helpful_count.saturating_add(1);
        let count = review.helpful_count;
        self.commit();
        Ok(count)
    }

    pub fn get_review(&self, review_id: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }

    /// All reviews, or only those for `listing_id`, in insertion order
    pub fn reviews(&self, listing_id: Option<&str>) -> Vec<Review> {
        self.matching(listing_id).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn rating_summary(&self, listing_id: Option<&str>) -> RatingSummary {
        RatingSummary::collect(self.matching(listing_id))
    }

    pub fn average_rating(&self, listing_id: Option<&str>) -> Option<f64> {
        self.rating_summary(listing_id).average
    }

    pub fn rating_breakdown(&self, listing_id: Option<&str>) -> [usize; 5] {
        self.rating_summary(listing_id).breakdown
    }

    fn matching<'a>(&'a self, listing_id: Option<&'a str>) -> impl Iterator<Item = &'a Review> + 'a {
        self.reviews
            .iter()
            .filter(move |r| listing_id.map_or(true, |id| r.listing_id == id))
    }

    fn commit(&self) {
        self.mirror.save(STORAGE_KEY, &self.reviews);
        let _ = self.events.send(StateEvent::ReviewsChanged {
            total: self.reviews.len(),
            timestamp: self.clock.now().timestamp(),
        });
    }
}
