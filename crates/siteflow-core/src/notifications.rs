//! Optional deployment notification wiring
//!
//! An observer on pipeline state transitions: an SNS topic, a topic policy
//! allowing the notification service to publish, and a rule binding the
//! pipeline's execution events to the topic. Attaching it never changes
//! pipeline control flow.

use crate::codepipeline::PipelineHandle;
use crate::error::Result;
use crate::iam::{PolicyDocument, PolicyStatement};
use crate::intrinsic::reference;
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

/// An SNS topic
#[derive(Debug, Clone)]
pub struct Topic {
    logical_id: String,
    topic_name: String,
    display_name: String,
}

impl Topic {
    pub fn new(
        logical_id: impl Into<String>,
        topic_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            topic_name: topic_name.into(),
            display_name: display_name.into(),
        }
    }
}

impl Construct for Topic {
    type Handle = TopicHandle;

    fn add_to(self, template: &mut Template) -> Result<TopicHandle> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::SNS::Topic",
                json!({
                    "TopicName": self.topic_name,
                    "DisplayName": self.display_name,
                }),
            ),
        )?;
        Ok(TopicHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TopicHandle {
    logical_id: String,
}

impl TopicHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Topic ARN (`Ref`)
    pub fn arn(&self) -> Value {
        reference(&self.logical_id)
    }
}

/// Grants the notification service publish access to a topic
#[derive(Debug, Clone)]
pub struct TopicPolicy {
    logical_id: String,
    topic: TopicHandle,
}

impl TopicPolicy {
    pub fn new(logical_id: impl Into<String>, topic: &TopicHandle) -> Self {
        Self {
            logical_id: logical_id.into(),
            topic: topic.clone(),
        }
    }
}

impl Construct for TopicPolicy {
    type Handle = ();

    fn add_to(self, template: &mut Template) -> Result<()> {
        let document = PolicyDocument::new().statement(
            PolicyStatement::allow()
                .action("sns:Publish")
                .resource(self.topic.arn())
                .service_principal("codestar-notifications.amazonaws.com"),
        );
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::SNS::TopicPolicy",
                json!({
                    "Topics": [self.topic.arn()],
                    "PolicyDocument": document.to_value(),
                }),
            ),
        )
    }
}

/// Pipeline execution events worth observing
pub const PIPELINE_EXECUTION_EVENTS: [&str; 4] = [
    "codepipeline-pipeline-pipeline-execution-failed",
    "codepipeline-pipeline-pipeline-execution-succeeded",
    "codepipeline-pipeline-pipeline-execution-started",
    "codepipeline-pipeline-pipeline-execution-canceled",
];

/// Binds pipeline execution events to an SNS target
#[derive(Debug, Clone)]
pub struct NotificationRule {
    logical_id: String,
    name: String,
    pipeline: PipelineHandle,
    target: TopicHandle,
    events: Vec<String>,
}

impl NotificationRule {
    pub fn new(
        logical_id: impl Into<String>,
        name: impl Into<String>,
        pipeline: &PipelineHandle,
        target: &TopicHandle,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            name: name.into(),
            pipeline: pipeline.clone(),
            target: target.clone(),
            events: PIPELINE_EXECUTION_EVENTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Construct for NotificationRule {
    type Handle = ();

    fn add_to(self, template: &mut Template) -> Result<()> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::CodeStarNotifications::NotificationRule",
                json!({
                    "Name": self.name,
                    "DetailType": "FULL",
                    "EventTypeIds": self.events,
                    "Resource": self.pipeline.arn(),
                    "Targets": [{
                        "TargetType": "SNS",
                        "TargetAddress": self.target.arn(),
                    }],
                }),
            ),
        )
    }
}
