pub mod cache;
pub mod log;
pub mod trace;
