//! # Core Module
//!
//! Crate-wide plumbing shared by every subsystem.
//!
//! ## Key Components
//! - `error`: The `EngineError` type returned by every fallible operation
//! - `logging`: One-shot `env_logger` initialization for binaries and demos

pub mod error;
pub mod logging;

pub use error::{EngineError, EngineResult};
