pub mod middleware;
pub mod password;
pub mod policy;
pub mod session;
pub mod validate;
