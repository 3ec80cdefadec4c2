//! Domain types, decision logic and port traits shared by every aprwatch crate.

pub mod common;
pub mod config;

pub mod rate {
    pub mod decision;
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod store {
    pub mod error;
    pub mod port;
}

pub mod notify {
    pub mod error;
    pub mod message;
    pub mod port;
}
