//! One detect-and-notify run: fetch, compare with the stored value, notify, save.

pub mod monitor;
