//! Command Inbound Adapter
//!
//! Translates parsed operator commands into service calls and renders the
//! outcome as JSON.

mod commands;

pub use commands::{Command, CommandError, execute};
