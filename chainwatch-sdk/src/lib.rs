//! API objects for chainwatch.
//!
//! These are the JSON shapes served by the chainwatch HTTP read layer.
//! They are plain value objects so that clients can depend on this crate
//! without pulling in the server runtime.

pub mod objects;
