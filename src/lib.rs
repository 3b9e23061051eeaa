//! ahdaf - Learning-objective generator for the Algerian primary physical
//! education curriculum.
//!
//! ## Architecture
//!
//! - **Selection**: cascading grade → field → resource choice over the
//!   embedded curriculum, driven by a pure reducer
//! - **Generator**: builds the prompt, calls a structured-output model and
//!   parses the `objectives` array
//! - **Session**: the controller tying both together (busy flag, error
//!   message, objectives)
//!
//! ## Failure model
//!
//! - Transport failures (network, auth, quota) surface as `Err`
//! - A reply that does not match the schema yields an empty list

pub mod client;
pub mod generator;
pub mod models;
pub mod render;
pub mod selection;
pub mod session;

// Re-exports for convenience
pub use client::{GeminiClient, StructuredModel};
pub use generator::{ModelObjectiveGenerator, ObjectiveGenerator};
pub use models::{AhdafError, Config, Curriculum, Result};
pub use render::render_document;
pub use selection::{Selection, SelectionAction, SelectionState};
pub use session::{GenerateOutcome, Session};
