pub mod export;
pub mod weekly;
