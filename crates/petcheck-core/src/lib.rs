//! petcheck-core: Core types and verdict logic for Pet Store contract checks
//!
//! This crate provides the configuration, the resource models, the schema
//! registry for response bodies, and the failure/severity/verdict types the
//! runner reports with.

pub mod config;
pub mod model;
pub mod report;
pub mod repro;
pub mod schema;
pub mod verdict;

pub use config::{Config, ConfigError, IdStrategy};
pub use model::{Category, Order, OrderStatus, Pet, PetStatus, Tag};
pub use report::{CaseReport, CaseStatus, StepRecord, StepStatus, Suite, SuiteReport};
pub use repro::to_http_file;
pub use schema::SchemaKind;
pub use verdict::{
    EXIT_ERRORED, Failure, FailureKind, RequestSnapshot, ResponseSnapshot, Severity, Verdict,
    VerdictPolicy, VerdictStatus,
};
