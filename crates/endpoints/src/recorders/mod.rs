//! Concrete destination endpoints

mod file;
mod log;

pub use file::FileRecorder;
pub use log::LogRecorder;
