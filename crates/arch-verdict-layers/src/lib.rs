//! # arch-verdict-layers
//!
//! Architecture rules over an exported element graph. This crate produces
//! the condition events that `arch-verdict-core` turns into results:
//!
//! - [`ElementGraph`] for the JSON graph of code elements and dependencies
//! - [`LayerResolver`] for name-to-layer mapping
//! - [`LayeredArchitectureRule`], [`DependencyPatternRule`] and [`NamingRule`]
//! - [`ArchRuleEngine`] for building and evaluating the configured rules
//! - [`LayerConfig`] for TOML-based layer/dependency/constraint definitions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod graph;
pub mod layer;
pub mod rules;

pub use config::{LayerConfig, LayerConfigError};
pub use engine::{ArchRuleEngine, AVAILABLE_RULES};
pub use graph::{CodeElement, Dependency, DependencyKind, ElementGraph, GraphError};
pub use layer::LayerResolver;
pub use rules::{DependencyPatternRule, LayeredArchitectureRule, NamingRule, RuleSettings};
