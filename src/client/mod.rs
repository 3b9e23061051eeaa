//! Generative model client module.

mod gemini;

pub use gemini::*;

#[cfg(test)]
pub(crate) use gemini::stub;
