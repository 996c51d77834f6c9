pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod time;
pub mod tree;

pub use error::{Result, TelqError};
