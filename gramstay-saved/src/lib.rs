pub mod models;
pub mod manager;

pub use models::{ItemKind, NewPlan, PlanDetail, SavedItemsSnapshot};
pub use manager::{SavedItemsManager, STORAGE_KEY};
