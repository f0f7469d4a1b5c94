use serde::{Deserialize, Serialize};
use validator::Validate;

/// The slice of a listing copied into a booking at creation time.
///
/// Bookings keep this snapshot so they still render after the listing
/// itself changes or disappears from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ListingSnapshot {
    #[validate(length(min = 1, message = "listing id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "listing title is required"))]
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub location: String,
}

impl ListingSnapshot {
    pub fn new(id: impl Into<String>, title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            images: Vec::new(),
            location: location.into(),
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// First image, used as the card thumbnail
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
