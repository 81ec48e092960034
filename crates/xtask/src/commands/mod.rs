//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod demo;
mod inspect_profile;

pub use demo::Demo;
pub use inspect_profile::InspectProfile;
