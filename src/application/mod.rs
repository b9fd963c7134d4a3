//! # Application Layer
//!
//! Contains the core business logic and orchestration of the relay.
//! This includes message classification, the relay engine, command routing,
//! reporting, and state management.

pub mod classifier;
pub mod formatter;
pub mod paginator;
pub mod relay;
pub mod report;
pub mod router;
pub mod state;
