//! # arch-verdict-core
//!
//! Evaluation and reporting core for architecture rules.
//!
//! Rules check code elements and record one [`ConditionEvent`] per element.
//! The violating events of a rule form an [`EvaluationResult`], which can be
//!
//! - merged with the results of sibling rules ([`EvaluationResult::add`]),
//! - narrowed to matching description lines
//!   ([`EvaluationResult::filter_descriptions_matching`]),
//! - dispatched to typed callbacks ([`EvaluationResult::handle_violations`]),
//! - rendered as a sorted [`FailureReport`].
//!
//! ## Example
//!
//! ```ignore
//! use arch_verdict_core::{ConditionEvents, EvaluationResult, Priority, SimpleConditionEvent};
//!
//! let mut events = ConditionEvents::new();
//! events.add(SimpleConditionEvent::violated(dependency, dependency.description()));
//!
//! let result = EvaluationResult::from_events("domain should not depend on infra", &events, Priority::High);
//! if result.has_violation() {
//!     eprintln!("{}", result.failure_report());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod event;
mod events;
mod handler;
mod priority;
mod report;
mod result;
mod rule;

pub use config::{Config, ConfigError, EvaluationConfig, RuleConfig};
pub use event::{ConditionEvent, CorrespondingObject, EventHandler, EventRef, SimpleConditionEvent};
pub use events::ConditionEvents;
pub use handler::ViolationHandler;
pub use priority::{Priority, UnknownPriority};
pub use report::{FailureMessages, FailureReport};
pub use result::EvaluationResult;
pub use rule::{
    check_all, ArchCondition, ArchRule, ArchRuleBox, CompositeArchRule, HasDescription, Never,
};
