//! File-backed persistence for the last observed supply APR.

pub mod json_file;
