pub mod attendance_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod notification_handlers;
pub mod schedule_handlers;
pub mod task_handlers;
pub mod user_handlers;
pub mod ws;
