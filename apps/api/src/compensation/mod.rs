//! Compensation & offer evaluation engine.
//!
//! Everything below `handlers` is pure and synchronous: no I/O, no shared mutable
//! state apart from the memoizing benchmark wrapper.

pub mod benchmarks;
pub mod evaluator;
pub mod exit_scenarios;
pub mod handlers;
pub mod missing_data;
pub mod models;
pub mod negotiation;
pub mod package_scorer;
pub mod risk_flags;
pub mod role_normalizer;
pub mod stage_defaults;
