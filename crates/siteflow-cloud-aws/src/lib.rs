//! CloudFormation engine for siteflow
//!
//! Binds the [`siteflow_cloud::Engine`] trait onto AWS: templates become
//! change sets, plans become change-set executions, and zone lookups go
//! through Route 53. CloudFormation keeps the resource state and performs
//! the actual diffing and ordering.

mod engine;

pub use engine::CloudFormationEngine;
