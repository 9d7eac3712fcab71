//! Session lifecycle management

pub mod manager;

pub use manager::{SessionManager, JOINED_STATUS};
