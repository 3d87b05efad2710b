pub mod holiday;
pub mod state;
pub mod summary;
pub mod timeclock;
