//! siteflow template model
//!
//! This crate provides the descriptor layer of siteflow: a CloudFormation
//! template keyed by logical id, intrinsic reference helpers, and typed
//! builders for every resource kind the blog stack declares.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 siteflow-stack                   │
//! │           (blog resource graph builder)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                siteflow-core                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Template / Resource / Construct          │   │
//! │  │  reference graph + validation             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  intrinsics  │  │ typed builders│            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │            siteflow-cloud(-aws)                  │
//! │     (change-set plan/apply via the engine)       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Construction is a single synchronous pass with no side effects; the
//! template is only submitted by an engine implementation.

pub mod acm;
pub mod buildspec;
pub mod cloudfront;
pub mod codebuild;
pub mod codepipeline;
pub mod connections;
pub mod error;
pub mod iam;
pub mod intrinsic;
pub mod notifications;
pub mod route53;
pub mod s3;
pub mod template;

// Re-exports
pub use error::{Result, TemplateError};
pub use route53::HostedZoneRef;
pub use template::{Construct, DeletionPolicy, Output, RemovalPolicy, Resource, Template};
