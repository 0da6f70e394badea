//! Tracker models

pub mod interval;
pub mod user;

// Re-export for convenience
pub use interval::{NewInterval, TimeInterval};
pub use user::{NewUser, UserAccount, hash_password};
