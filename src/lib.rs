//! Anatomap - clinical note analysis and anatomical diagram recommendation.
//!
//! Ingests free-text medical examination notes and produces structured
//! clinical findings, a ranked set of anatomical diagram views, and a
//! confidence-scored hybrid result that can be cross-checked against a
//! language-model call. The deterministic pipeline is pure and synchronous;
//! only the model gateway performs IO.
//!
//! This crate classifies and routes. It does not diagnose, and it does not
//! generate prose.

pub mod analyzer;
pub mod complexity;
pub mod context;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod recommend;
pub mod scorer;
pub mod terminology;
pub mod types;

pub use analyzer::Analyzer;
pub use error::ModelError;
pub use llm::{ModelConfig, ModelKind};
pub use types::*;
