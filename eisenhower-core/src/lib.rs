//! Core task model and pure state transitions for Eisenhower.
//!
//! Nothing in this crate touches storage or the terminal: front ends build
//! [`reducer::TaskAction`]s, run them through [`reducer::reduce`], and read
//! the derived view back from the [`query`] functions.

pub mod codec;
pub mod query;
pub mod reducer;
pub mod task;
