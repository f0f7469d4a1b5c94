pub mod models;

pub use models::events::StateEvent;
pub use models::listing::ListingSnapshot;
