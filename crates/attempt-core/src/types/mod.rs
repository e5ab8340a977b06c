//! Type definitions for attempt policies

mod policy;

pub use policy::*;
