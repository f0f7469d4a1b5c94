use serde::{Deserialize, Serialize};

/// Change notification broadcast by a container after every effective mutation.
///
/// Each variant carries the derived state a subscriber most likely re-renders,
/// so a consumer can update badges without re-reading the container.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateEvent {
    SavedItemsChanged {
        total_saved: usize,
        timestamp: i64,
    },
    BookingsChanged {
        total: usize,
        upcoming: usize,
        timestamp: i64,
    },
    ReviewsChanged {
        total: usize,
        timestamp: i64,
    },
}

impl StateEvent {
    /// Storage key of the container that emitted the event
    pub fn source_key(&self) -> &'static str {
        match self {
            StateEvent::SavedItemsChanged { .. } => "savedItems",
            StateEvent::BookingsChanged { .. } => "bookings",
            StateEvent::ReviewsChanged { .. } => "reviews",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = StateEvent::BookingsChanged { total: 3, upcoming: 1, timestamp: 1_700_000_000 };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "BOOKINGS_CHANGED");
        assert_eq!(json["upcoming"], 1);
        assert_eq!(event.source_key(), "bookings");
    }
}
