pub mod config;
pub mod summary;
pub mod task;
pub mod timer;
