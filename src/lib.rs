//! Deterministic token-budget decision engine for LLM context assembly.
//!
//! `context-budget` takes a set of candidate documents, a natural-language
//! requirements string, and a token budget, and decides which documents fit
//! inside that budget while maximizing relevance: token accounting,
//! weighted multi-factor relevance scoring, overflow detection, and greedy
//! capacity-constrained selection with deterministic tie-breaking.
//! Identical inputs and configuration always produce identical decisions.
//!
//! Document ingestion, language-model invocation, and durable storage stay
//! outside the crate; they plug in through the [`config::ConfigPersistence`]
//! and [`analytics::AnalyticsSink`] traits.
//!
//! See <https://github.com/contextenginehq/context-engine> for the full platform.

pub mod analytics;
pub mod config;
pub mod document;
pub mod engine;
pub mod selection;
pub mod telemetry;
pub mod types;

pub use engine::{AppliedSelection, CheckOverflowRequest, ContextBudgetEngine, OverflowCheckResponse};
