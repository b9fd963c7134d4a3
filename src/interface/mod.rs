//! # Interface Layer
//!
//! Command handlers invoked by the router on behalf of chat users.

pub mod commands;
