//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the sync engine:
//! - Logging and tracing initialization
//! - Event bus for progress reporting
//!
//! ## Overview
//!
//! This crate contains the ambient utilities the engine depends on. It
//! establishes the logging conventions and the event broadcasting mechanism
//! through which the pipeline reports progress to whoever is listening
//! (a CLI frontend, a test harness) without taking a dependency on them.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
