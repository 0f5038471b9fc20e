//! Concrete source endpoints

mod expvar;

pub use expvar::ExpvarReader;
