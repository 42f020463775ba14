//! CloudFormation engine implementation

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::{DisplayErrorContext, SdkError};
use aws_sdk_cloudformation::types::{Capability, Change, ChangeAction, ChangeSetType, Replacement};
use siteflow_cloud::{
    Action, ActionKind, ApplyOutcome, AuthStatus, Engine, EngineError, Plan, Result,
};
use siteflow_core::{HostedZoneRef, Template};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const CHANGE_SET_NAME: &str = "siteflow-plan";

/// Engine backed by CloudFormation change sets
pub struct CloudFormationEngine {
    cloudformation: aws_sdk_cloudformation::Client,
    route53: aws_sdk_route53::Client,
    sts: aws_sdk_sts::Client,
    expected_account: Option<String>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl CloudFormationEngine {
    /// Build an engine from the default credential chain
    ///
    /// `expected_account` guards against deploying with credentials for the
    /// wrong account; certificate validation can keep an apply in progress
    /// for a while, hence the generous polling window.
    pub async fn new(region: Option<String>, expected_account: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&config),
            route53: aws_sdk_route53::Client::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
            expected_account,
            poll_interval: Duration::from_secs(5),
            max_attempts: 360,
        }
    }

    async fn current_status(&self, stack_name: &str) -> Result<Option<String>> {
        match self
            .cloudformation
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(output) => Ok(output
                .stacks()
                .first()
                .map(|stack| stack.stack_status().map(|s| s.as_str().to_string()).unwrap_or_default())),
            Err(err) => {
                let text = format!("{}", DisplayErrorContext(err));
                if text.contains("does not exist") {
                    Ok(None)
                } else {
                    Err(EngineError::ApiError(text))
                }
            }
        }
    }

    async fn wait_for_change_set(&self, change_set_id: &str) -> Result<Plan> {
        for _ in 0..self.max_attempts {
            let described = self
                .cloudformation
                .describe_change_set()
                .change_set_name(change_set_id)
                .send()
                .await
                .map_err(api_error)?;
            let status = described
                .status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();

            match status.as_str() {
                "CREATE_COMPLETE" => {
                    let actions = described.changes().iter().filter_map(map_change).collect();
                    return Ok(Plan {
                        change_set_id: Some(change_set_id.to_string()),
                        actions,
                    });
                }
                "FAILED" => {
                    let reason = described
                        .status_reason()
                        .unwrap_or("no reason given")
                        .to_string();
                    if is_no_change_reason(&reason) {
                        tracing::debug!("Change set contained no changes");
                        let _ = self
                            .cloudformation
                            .delete_change_set()
                            .change_set_name(change_set_id)
                            .send()
                            .await;
                        return Ok(Plan::empty());
                    }
                    return Err(EngineError::ChangeSetFailed(reason));
                }
                _ => sleep(self.poll_interval).await,
            }
        }
        Err(EngineError::Timeout(format!(
            "change set {change_set_id} did not settle"
        )))
    }

    async fn wait_for_stack(&self, stack_name: &str) -> Result<(String, String, BTreeMap<String, String>)> {
        for _ in 0..self.max_attempts {
            let output = self
                .cloudformation
                .describe_stacks()
                .stack_name(stack_name)
                .send()
                .await
                .map_err(api_error)?;
            let Some(stack) = output.stacks().first() else {
                return Err(EngineError::StackNotFound(stack_name.to_string()));
            };

            let status = stack.stack_status().map(|s| s.as_str().to_string()).unwrap_or_default();
            if status.ends_with("_IN_PROGRESS") {
                sleep(self.poll_interval).await;
                continue;
            }

            let stack_id = stack.stack_id().unwrap_or_default().to_string();
            let outputs = stack
                .outputs()
                .iter()
                .filter_map(|o| Some((o.output_key()?.to_string(), o.output_value()?.to_string())))
                .collect();
            return Ok((stack_id, status, outputs));
        }
        Err(EngineError::Timeout(format!(
            "stack {stack_name} did not reach a terminal status"
        )))
    }
}

#[async_trait]
impl Engine for CloudFormationEngine {
    fn name(&self) -> &str {
        "cloudformation"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.sts.get_caller_identity().send().await {
            Ok(identity) => {
                let account = identity.account().unwrap_or("unknown").to_string();
                if let Some(expected) = &self.expected_account {
                    if &account != expected {
                        return Ok(AuthStatus::failed(format!(
                            "credentials belong to account {account}, expected {expected}"
                        )));
                    }
                }
                Ok(AuthStatus::ok(account))
            }
            Err(err) => Ok(AuthStatus::failed(format!("{}", DisplayErrorContext(err)))),
        }
    }

    async fn lookup_zone(&self, domain_name: &str) -> Result<HostedZoneRef> {
        let output = self
            .route53
            .list_hosted_zones_by_name()
            .dns_name(domain_name)
            .send()
            .await
            .map_err(api_error)?;

        let wanted = normalize_zone_name(domain_name);
        let zone = output
            .hosted_zones()
            .iter()
            .find(|zone| normalize_zone_name(zone.name()) == wanted)
            .ok_or_else(|| EngineError::ZoneNotFound(domain_name.to_string()))?;

        tracing::info!("Resolved hosted zone {} for {}", zone.id(), wanted);
        Ok(HostedZoneRef::new(strip_zone_prefix(zone.id()), wanted))
    }

    async fn plan(&self, stack_name: &str, template: &Template) -> Result<Plan> {
        let change_set_type = match self.current_status(stack_name).await? {
            // a never-executed create leaves an empty stack shell behind
            Some(status) if status == "REVIEW_IN_PROGRESS" => ChangeSetType::Create,
            Some(_) => ChangeSetType::Update,
            None => ChangeSetType::Create,
        };

        // drop any stale change set under our name before preparing a new one
        let _ = self
            .cloudformation
            .delete_change_set()
            .stack_name(stack_name)
            .change_set_name(CHANGE_SET_NAME)
            .send()
            .await;

        tracing::info!("Creating change set for stack {}", stack_name);
        let created = self
            .cloudformation
            .create_change_set()
            .stack_name(stack_name)
            .change_set_name(CHANGE_SET_NAME)
            .change_set_type(change_set_type)
            .template_body(template.to_json()?)
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .send()
            .await
            .map_err(api_error)?;

        let change_set_id = created.id().unwrap_or(CHANGE_SET_NAME).to_string();
        self.wait_for_change_set(&change_set_id).await
    }

    async fn apply(&self, stack_name: &str, plan: &Plan) -> Result<ApplyOutcome> {
        let Some(change_set_id) = plan.change_set_id.as_deref() else {
            return Err(EngineError::ApplyFailed(
                "plan has no prepared change set".to_string(),
            ));
        };

        let start = Instant::now();
        tracing::info!("Executing change set for stack {}", stack_name);
        self.cloudformation
            .execute_change_set()
            .change_set_name(change_set_id)
            .send()
            .await
            .map_err(api_error)?;

        // let the stack leave its previous terminal status before polling
        sleep(self.poll_interval).await;
        let (stack_id, status, outputs) = self.wait_for_stack(stack_name).await?;
        if !is_success_status(&status) {
            return Err(EngineError::ApplyFailed(format!(
                "stack {stack_name} ended in {status}"
            )));
        }

        Ok(ApplyOutcome {
            stack_id,
            status,
            outputs,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn destroy(&self, stack_name: &str) -> Result<()> {
        tracing::info!("Deleting stack {}", stack_name);
        self.cloudformation
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(api_error)?;

        for _ in 0..self.max_attempts {
            match self.current_status(stack_name).await? {
                None => return Ok(()),
                Some(status) if status == "DELETE_COMPLETE" => return Ok(()),
                Some(status) if status == "DELETE_FAILED" => {
                    return Err(EngineError::ApplyFailed(format!(
                        "stack {stack_name} could not be deleted"
                    )));
                }
                Some(_) => sleep(self.poll_interval).await,
            }
        }
        Err(EngineError::Timeout(format!(
            "stack {stack_name} was not deleted in time"
        )))
    }

    async fn status(&self, stack_name: &str) -> Result<Option<String>> {
        self.current_status(stack_name).await
    }
}

fn api_error<E>(err: SdkError<E>) -> EngineError
where
    E: std::error::Error + 'static,
{
    EngineError::ApiError(format!("{}", DisplayErrorContext(err)))
}

fn map_change(change: &Change) -> Option<Action> {
    let resource_change = change.resource_change()?;
    let kind = match resource_change.action()? {
        ChangeAction::Add => ActionKind::Create,
        ChangeAction::Modify => ActionKind::Update,
        ChangeAction::Remove => ActionKind::Delete,
        _ => return None,
    };
    Some(Action {
        kind,
        logical_id: resource_change.logical_resource_id().unwrap_or_default().to_string(),
        resource_type: resource_change.resource_type().unwrap_or_default().to_string(),
        replacement: matches!(resource_change.replacement(), Some(Replacement::True)),
    })
}

fn is_no_change_reason(reason: &str) -> bool {
    reason.contains("didn't contain changes") || reason.contains("No updates are to be performed")
}

fn is_success_status(status: &str) -> bool {
    matches!(status, "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "IMPORT_COMPLETE")
}

fn normalize_zone_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

fn strip_zone_prefix(id: &str) -> &str {
    id.strip_prefix("/hostedzone/").unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cloudformation::types::ResourceChange;

    #[test]
    fn test_zone_name_normalization() {
        assert_eq!(normalize_zone_name("Example.COM."), "example.com");
        assert_eq!(normalize_zone_name("example.com"), "example.com");
    }

    #[test]
    fn test_zone_prefix_stripping() {
        assert_eq!(strip_zone_prefix("/hostedzone/Z0362963BNKBMPFIYIVW"), "Z0362963BNKBMPFIYIVW");
        assert_eq!(strip_zone_prefix("Z0362963BNKBMPFIYIVW"), "Z0362963BNKBMPFIYIVW");
    }

    #[test]
    fn test_success_statuses() {
        assert!(is_success_status("CREATE_COMPLETE"));
        assert!(is_success_status("UPDATE_COMPLETE"));
        assert!(!is_success_status("ROLLBACK_COMPLETE"));
        assert!(!is_success_status("UPDATE_ROLLBACK_COMPLETE"));
        assert!(!is_success_status("CREATE_FAILED"));
    }

    #[test]
    fn test_no_change_reasons() {
        assert!(is_no_change_reason(
            "The submitted information didn't contain changes. Submit different information to create a change set."
        ));
        assert!(is_no_change_reason("No updates are to be performed."));
        assert!(!is_no_change_reason("Access denied"));
    }

    #[test]
    fn test_change_mapping() {
        let change = Change::builder()
            .resource_change(
                ResourceChange::builder()
                    .action(ChangeAction::Add)
                    .logical_resource_id("StaticSiteBucket")
                    .resource_type("AWS::S3::Bucket")
                    .build(),
            )
            .build();
        let action = map_change(&change).unwrap();
        assert_eq!(action.kind, ActionKind::Create);
        assert_eq!(action.logical_id, "StaticSiteBucket");
        assert!(!action.replacement);

        let replacement = Change::builder()
            .resource_change(
                ResourceChange::builder()
                    .action(ChangeAction::Modify)
                    .logical_resource_id("StaticDistribution")
                    .resource_type("AWS::CloudFront::Distribution")
                    .replacement(Replacement::True)
                    .build(),
            )
            .build();
        let action = map_change(&replacement).unwrap();
        assert_eq!(action.kind, ActionKind::Update);
        assert!(action.replacement);

        assert!(map_change(&Change::builder().build()).is_none());
    }
}
