//! `eisenhower`: Eisenhower-matrix personal task manager.
//!
//! Wires the pure core in `eisenhower_core` to a persistent key-value store
//! and a command-line front end.

pub mod commands;
pub mod config;
pub mod session;
pub mod storage;
