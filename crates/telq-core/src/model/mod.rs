pub mod aggregate;
pub mod log;
pub mod span;
