//! CodePipeline descriptors
//!
//! A pipeline is an ordered list of stages; each stage holds actions with an
//! explicit run order. Artifacts are opaque named handles threaded from one
//! action's outputs into a later action's input.

use crate::codebuild::ProjectHandle;
use crate::connections::ConnectionHandle;
use crate::error::Result;
use crate::iam::RoleHandle;
use crate::intrinsic::{reference, sub};
use crate::s3::BucketHandle;
use crate::template::{Construct, RemovalPolicy, Resource, Template};
use serde_json::{Value, json};

/// An opaque handle to a file-set passed between stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A single pipeline action
#[derive(Debug, Clone)]
pub enum Action {
    /// Pull the configured repository through a provider connection
    CodeStarSource {
        action_name: String,
        connection: ConnectionHandle,
        owner: String,
        repo: String,
        branch: String,
        output: Artifact,
        run_order: u32,
    },
    /// Run a CodeBuild project over an input artifact
    CodeBuild {
        action_name: String,
        project: ProjectHandle,
        input: Artifact,
        outputs: Vec<Artifact>,
        run_order: u32,
    },
    /// Extract an artifact into a bucket
    S3Deploy {
        action_name: String,
        bucket: BucketHandle,
        input: Artifact,
        run_order: u32,
    },
}

impl Action {
    fn to_value(&self) -> Value {
        match self {
            Action::CodeStarSource {
                action_name,
                connection,
                owner,
                repo,
                branch,
                output,
                run_order,
            } => json!({
                "Name": action_name,
                "ActionTypeId": {
                    "Category": "Source",
                    "Owner": "AWS",
                    "Provider": "CodeStarSourceConnection",
                    "Version": "1",
                },
                "Configuration": {
                    "ConnectionArn": connection.arn(),
                    "FullRepositoryId": format!("{owner}/{repo}"),
                    "BranchName": branch,
                },
                "OutputArtifacts": [{ "Name": output.name() }],
                "RunOrder": run_order,
            }),
            Action::CodeBuild {
                action_name,
                project,
                input,
                outputs,
                run_order,
            } => {
                let mut value = json!({
                    "Name": action_name,
                    "ActionTypeId": {
                        "Category": "Build",
                        "Owner": "AWS",
                        "Provider": "CodeBuild",
                        "Version": "1",
                    },
                    "Configuration": { "ProjectName": project.name() },
                    "InputArtifacts": [{ "Name": input.name() }],
                    "RunOrder": run_order,
                });
                if !outputs.is_empty() {
                    let outputs: Vec<Value> =
                        outputs.iter().map(|a| json!({ "Name": a.name() })).collect();
                    value["OutputArtifacts"] = Value::Array(outputs);
                }
                value
            }
            Action::S3Deploy {
                action_name,
                bucket,
                input,
                run_order,
            } => json!({
                "Name": action_name,
                "ActionTypeId": {
                    "Category": "Deploy",
                    "Owner": "AWS",
                    "Provider": "S3",
                    "Version": "1",
                },
                "Configuration": {
                    "BucketName": bucket.name(),
                    "Extract": "true",
                },
                "InputArtifacts": [{ "Name": input.name() }],
                "RunOrder": run_order,
            }),
        }
    }
}

/// A named stage holding one or more actions
#[derive(Debug, Clone)]
pub struct Stage {
    name: String,
    actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    fn to_value(&self) -> Value {
        json!({
            "Name": self.name,
            "Actions": self.actions.iter().map(Action::to_value).collect::<Vec<_>>(),
        })
    }
}

/// An ordered build/deploy pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    logical_id: String,
    pipeline_name: Option<String>,
    role: RoleHandle,
    artifact_bucket: BucketHandle,
    stages: Vec<Stage>,
    removal_policy: Option<RemovalPolicy>,
}

impl Pipeline {
    pub fn new(logical_id: impl Into<String>, role: &RoleHandle, artifact_bucket: &BucketHandle) -> Self {
        Self {
            logical_id: logical_id.into(),
            pipeline_name: None,
            role: role.clone(),
            artifact_bucket: artifact_bucket.clone(),
            stages: Vec::new(),
            removal_policy: None,
        }
    }

    pub fn pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = Some(name.into());
        self
    }

    /// Append a stage; stage order is execution order
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = Some(policy);
        self
    }
}

impl Construct for Pipeline {
    type Handle = PipelineHandle;

    fn add_to(self, template: &mut Template) -> Result<PipelineHandle> {
        let mut properties = json!({
            "RoleArn": self.role.arn(),
            "ArtifactStore": {
                "Type": "S3",
                "Location": self.artifact_bucket.name(),
            },
            "Stages": self.stages.iter().map(Stage::to_value).collect::<Vec<_>>(),
        });
        if let Some(name) = &self.pipeline_name {
            properties["Name"] = json!(name);
        }

        let mut resource = Resource::new("AWS::CodePipeline::Pipeline", properties);
        if let Some(policy) = self.removal_policy {
            resource = resource.with_removal_policy(policy);
        }
        template.add_resource(&self.logical_id, resource)?;
        Ok(PipelineHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineHandle {
    logical_id: String,
}

impl PipelineHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Pipeline name (`Ref`)
    pub fn name(&self) -> Value {
        reference(&self.logical_id)
    }

    pub fn arn(&self) -> Value {
        sub(&format!(
            "arn:aws:codepipeline:${{AWS::Region}}:${{AWS::AccountId}}:${{{}}}",
            self.logical_id
        ))
    }
}
