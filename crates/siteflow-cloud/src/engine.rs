//! Provisioning engine trait

use crate::error::Result;
use crate::plan::{ApplyOutcome, Plan};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use siteflow_core::{HostedZoneRef, Template};

/// Abstraction over the external provisioning engine
///
/// The engine owns the hard parts: diffing the template against live
/// infrastructure, ordering resource operations, and rolling back partial
/// failures. Implementations translate the calls below onto a concrete
/// provisioning API.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name (e.g. "cloudformation")
    fn name(&self) -> &str;

    /// Check credentials before any mutating call
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Resolve a pre-existing hosted zone by its apex domain
    async fn lookup_zone(&self, domain_name: &str) -> Result<HostedZoneRef>;

    /// Diff the template against the live stack and prepare a change set
    async fn plan(&self, stack_name: &str, template: &Template) -> Result<Plan>;

    /// Execute a previously prepared plan and wait for a terminal status
    async fn apply(&self, stack_name: &str, plan: &Plan) -> Result<ApplyOutcome>;

    /// Tear the stack down and wait until it is gone
    async fn destroy(&self, stack_name: &str) -> Result<()>;

    /// Current stack status, or `None` if the stack does not exist
    async fn status(&self, stack_name: &str) -> Result<Option<String>>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether credentials are usable
    pub authenticated: bool,

    /// Account/caller information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
