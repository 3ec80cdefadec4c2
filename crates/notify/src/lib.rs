//! Notification channels for supply APR changes.

pub mod discord;
pub mod email;
pub mod telegram;
