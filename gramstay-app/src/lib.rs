pub mod state;
pub mod summary;

pub use state::AppState;
pub use summary::{DashboardSummary, ListingSummary};
