//! Deterministic analysis engine: skill extraction and fit scoring.
//!
//! Nothing in this module performs I/O or calls the LLM. Every number the
//! agent reports comes from here.

pub mod fit_scorer;
pub mod skill_extractor;
