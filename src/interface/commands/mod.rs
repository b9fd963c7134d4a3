//! # Command Handlers
//!
//! Contains specific handler functions for each supported command
//! (e.g., .add, .profit, .status). These handlers are invoked by the Router.

pub mod classifieds;
pub mod help;
pub mod misc;
pub mod report;
pub mod send;
pub mod wizard;
