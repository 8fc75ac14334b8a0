pub mod attendance;
pub mod notification;
pub mod schedule;
pub mod task;
pub mod user;
