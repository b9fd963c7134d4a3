//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatProvider, HttpTransport).

pub mod http;
pub mod lookup;
pub mod matrix;
pub mod pricing;
pub mod update_check;
