pub mod energy;
pub mod measuring_points;
pub mod sync_history;
