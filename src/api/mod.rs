pub mod attendance;
pub mod employee;
pub mod expense;
pub mod holiday;
pub mod leave_request;
pub mod report;
pub mod shift;
