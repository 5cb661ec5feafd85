//! End-to-end export tests
//!
//! Layouts are exported through a full session and checked either on the
//! recorded writer commands or on the unpacked XLSX package.

mod common;
mod limits;
mod properties;
mod scenarios;
mod xlsx;
