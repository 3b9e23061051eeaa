//! Core data models for ahdaf.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): The curriculum tree, fixed at build time
//! - B_i (Beliefs): Config and model replies, wrapped in Result/Option
//! - I^R (Resolvable): Config parameters

mod config;
mod curriculum;
mod error;

pub use config::*;
pub use curriculum::*;
pub use error::*;
