//! IAM roles and policy documents

use crate::error::Result;
use crate::intrinsic::get_att;
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// A single policy statement
#[derive(Debug, Clone)]
pub struct PolicyStatement {
    effect: Effect,
    actions: Vec<String>,
    resources: Vec<Value>,
    principal: Option<Value>,
}

impl PolicyStatement {
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            actions: Vec::new(),
            resources: Vec::new(),
            principal: None,
        }
    }

    pub fn action(mut self, action: &str) -> Self {
        self.actions.push(action.to_string());
        self
    }

    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.actions.extend(actions.iter().map(|a| a.to_string()));
        self
    }

    pub fn resource(mut self, resource: Value) -> Self {
        self.resources.push(resource);
        self
    }

    /// Principal entry, used by resource-based policies (bucket/topic)
    pub fn principal(mut self, principal: Value) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn service_principal(self, service: &str) -> Self {
        self.principal(json!({ "Service": service }))
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut statement = json!({
            "Effect": self.effect.as_str(),
            "Action": self.actions,
        });
        if !self.resources.is_empty() {
            statement["Resource"] = Value::Array(self.resources.clone());
        }
        if let Some(principal) = &self.principal {
            statement["Principal"] = principal.clone();
        }
        statement
    }
}

/// An IAM policy document
#[derive(Debug, Clone, Default)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn to_value(&self) -> Value {
        json!({
            "Version": POLICY_VERSION,
            "Statement": self.statements.iter().map(PolicyStatement::to_value).collect::<Vec<_>>(),
        })
    }
}

/// An IAM role assumable by a single service principal, with inline policies
#[derive(Debug, Clone)]
pub struct Role {
    logical_id: String,
    assumed_by: String,
    policies: Vec<(String, PolicyDocument)>,
}

impl Role {
    pub fn new(logical_id: impl Into<String>, assumed_by: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            assumed_by: assumed_by.into(),
            policies: Vec::new(),
        }
    }

    pub fn inline_policy(mut self, name: &str, document: PolicyDocument) -> Self {
        self.policies.push((name.to_string(), document));
        self
    }
}

impl Construct for Role {
    type Handle = RoleHandle;

    fn add_to(self, template: &mut Template) -> Result<RoleHandle> {
        let policies: Vec<Value> = self
            .policies
            .iter()
            .map(|(name, document)| {
                json!({ "PolicyName": name, "PolicyDocument": document.to_value() })
            })
            .collect();

        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": self.assumed_by },
                    "Action": "sts:AssumeRole",
                }],
            },
        });
        if !policies.is_empty() {
            properties["Policies"] = Value::Array(policies);
        }

        template.add_resource(&self.logical_id, Resource::new("AWS::IAM::Role", properties))?;
        Ok(RoleHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RoleHandle {
    logical_id: String,
}

impl RoleHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn arn(&self) -> Value {
        get_att(&self.logical_id, "Arn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_shape() {
        let statement = PolicyStatement::allow()
            .action("cloudfront:CreateInvalidation")
            .resource(json!("arn:aws:cloudfront::123456789012:distribution/ABC"));
        let value = statement.to_value();
        assert_eq!(value["Effect"], "Allow");
        assert_eq!(value["Action"][0], "cloudfront:CreateInvalidation");
        assert_eq!(value["Resource"][0], "arn:aws:cloudfront::123456789012:distribution/ABC");
        assert!(value.get("Principal").is_none());
    }

    #[test]
    fn test_role_assume_policy() {
        let mut template = Template::new("test");
        let role = template
            .add(Role::new("BuildRole", "codebuild.amazonaws.com").inline_policy(
                "Logs",
                PolicyDocument::new().statement(
                    PolicyStatement::allow()
                        .actions(&["logs:CreateLogGroup", "logs:PutLogEvents"])
                        .resource(json!("*")),
                ),
            ))
            .unwrap();
        assert_eq!(role.logical_id(), "BuildRole");

        let resource = template.get("BuildRole").unwrap();
        let assume = &resource.properties["AssumeRolePolicyDocument"]["Statement"][0];
        assert_eq!(assume["Principal"]["Service"], "codebuild.amazonaws.com");
        assert_eq!(resource.properties["Policies"][0]["PolicyName"], "Logs");
    }
}
