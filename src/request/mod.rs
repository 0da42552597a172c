//! Request subsystem
//!
//! Translates an entity spec into the minimal read request that covers
//! every bound field.

mod builder;

pub use builder::RequestBuilder;
