pub mod hypothesis;
pub mod stats;
