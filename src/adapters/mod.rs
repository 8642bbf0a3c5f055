//! Adapters Layer
//!
//! Outbound implementations of the domain ports.

pub mod outbound;
