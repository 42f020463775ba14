//! Template assembly and dependency-graph validation
//!
//! A [`Template`] owns the full set of logical resources and their outputs.
//! Resources reference each other through intrinsics; the template exposes
//! that graph explicitly so that construction-order mistakes (a dangling
//! reference, a cycle) fail at build time rather than at apply time.

use crate::error::{Result, TemplateError};
use crate::intrinsic;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const FORMAT_VERSION: &str = "2010-09-09";

/// Teardown behavior requested for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Delete the resource when the stack is destroyed or the resource replaced
    Destroy,
    /// Keep the resource alive after removal from the stack
    Retain,
}

/// Serialized CloudFormation policy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
}

/// A single logical resource entry
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties")]
    pub properties: Value,

    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,

    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        let value = match policy {
            RemovalPolicy::Destroy => DeletionPolicy::Delete,
            RemovalPolicy::Retain => DeletionPolicy::Retain,
        };
        self.deletion_policy = Some(value);
        self.update_replace_policy = Some(value);
        self
    }

    pub fn with_depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }
}

/// A template output entry
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Value")]
    pub value: Value,
}

/// Anything that can add itself to a template and hand back a typed handle
///
/// Handles carry the logical id and mint intrinsic references (Ref, GetAtt,
/// Sub) for wiring one descriptor's outputs into another's inputs.
pub trait Construct {
    type Handle;

    fn add_to(self, template: &mut Template) -> Result<Self::Handle>;
}

/// A CloudFormation template under construction
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(rename = "Resources")]
    resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            description: Some(description.into()),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Add a typed construct and return its handle
    pub fn add<C: Construct>(&mut self, construct: C) -> Result<C::Handle> {
        construct.add_to(self)
    }

    /// Add a raw resource under a logical id
    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) -> Result<()> {
        if logical_id.is_empty() || !logical_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TemplateError::InvalidLogicalId(logical_id.to_string()));
        }
        if self.resources.contains_key(logical_id) {
            return Err(TemplateError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    pub fn add_output(&mut self, name: &str, description: &str, value: Value) {
        self.outputs.insert(
            name.to_string(),
            Output {
                description: Some(description.to_string()),
                value,
            },
        );
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources.iter()
    }

    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&str, &Resource)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .map(|(id, r)| (id.as_str(), r))
            .collect()
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&String, &Output)> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Logical ids referenced by a resource, via intrinsics and DependsOn
    pub fn references_of(&self, logical_id: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if let Some(resource) = self.resources.get(logical_id) {
            intrinsic::collect_references(&resource.properties, &mut out);
            for dep in &resource.depends_on {
                out.insert(dep.clone());
            }
        }
        out
    }

    /// Check the reference graph: every reference must resolve to a declared
    /// resource and the graph must be acyclic. Output values are checked for
    /// dangling references as well.
    pub fn validate(&self) -> Result<()> {
        for (id, _) in self.resources.iter() {
            for target in self.references_of(id) {
                if !self.resources.contains_key(&target) {
                    return Err(TemplateError::DanglingReference {
                        source_id: id.clone(),
                        target,
                    });
                }
            }
        }
        for (name, output) in self.outputs.iter() {
            let mut targets = BTreeSet::new();
            intrinsic::collect_references(&output.value, &mut targets);
            for target in targets {
                if !self.resources.contains_key(&target) {
                    return Err(TemplateError::DanglingReference {
                        source_id: format!("output {name}"),
                        target,
                    });
                }
            }
        }

        let mut state: BTreeMap<&str, VisitState> = BTreeMap::new();
        for id in self.resources.keys() {
            self.visit(id, &mut state)?;
        }
        Ok(())
    }

    fn visit<'a>(&'a self, id: &'a str, state: &mut BTreeMap<&'a str, VisitState>) -> Result<()> {
        match state.get(id) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                return Err(TemplateError::DependencyCycle(id.to_string()));
            }
            None => {}
        }
        state.insert(id, VisitState::InProgress);
        if let Some((key, _)) = self.resources.get_key_value(id) {
            for target in self.references_of(key) {
                let Some((target_key, _)) = self.resources.get_key_value(&target) else {
                    continue;
                };
                self.visit(target_key, state)?;
            }
        }
        state.insert(id, VisitState::Done);
        Ok(())
    }

    /// Render the template as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(properties: Value) -> Resource {
        Resource::new("AWS::S3::Bucket", properties)
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut template = Template::new("test");
        template.add_resource("Bucket", bucket(json!({}))).unwrap();
        let err = template.add_resource("Bucket", bucket(json!({}))).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateLogicalId(_)));
    }

    #[test]
    fn test_invalid_logical_id_rejected() {
        let mut template = Template::new("test");
        let err = template.add_resource("my-bucket", bucket(json!({}))).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidLogicalId(_)));
    }

    #[test]
    fn test_dangling_reference_detected() {
        let mut template = Template::new("test");
        template
            .add_resource(
                "Policy",
                Resource::new("AWS::S3::BucketPolicy", json!({ "Bucket": { "Ref": "Missing" } })),
            )
            .unwrap();
        let err = template.validate().unwrap_err();
        match err {
            TemplateError::DanglingReference { source_id: source, target } => {
                assert_eq!(source, "Policy");
                assert_eq!(target, "Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_output_detected() {
        let mut template = Template::new("test");
        template.add_output("BucketName", "name", json!({ "Ref": "Missing" }));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let mut template = Template::new("test");
        template
            .add_resource("A", bucket(json!({ "Peer": { "Ref": "B" } })))
            .unwrap();
        template
            .add_resource("B", bucket(json!({ "Peer": { "Ref": "A" } })))
            .unwrap();
        let err = template.validate().unwrap_err();
        assert!(matches!(err, TemplateError::DependencyCycle(_)));
    }

    #[test]
    fn test_valid_chain_passes() {
        let mut template = Template::new("test");
        template.add_resource("Bucket", bucket(json!({}))).unwrap();
        template
            .add_resource(
                "Policy",
                Resource::new("AWS::S3::BucketPolicy", json!({ "Bucket": { "Ref": "Bucket" } })),
            )
            .unwrap();
        template.add_output("BucketArn", "arn", intrinsic::get_att("Bucket", "Arn"));
        template.validate().unwrap();
        assert_eq!(
            template.references_of("Policy").into_iter().collect::<Vec<_>>(),
            vec!["Bucket"]
        );
    }

    #[test]
    fn test_serialization_shape() {
        let mut template = Template::new("demo stack");
        template
            .add_resource(
                "Bucket",
                bucket(json!({})).with_removal_policy(RemovalPolicy::Destroy),
            )
            .unwrap();
        let rendered: Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
        assert_eq!(rendered["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(rendered["Description"], "demo stack");
        assert_eq!(rendered["Resources"]["Bucket"]["Type"], "AWS::S3::Bucket");
        assert_eq!(rendered["Resources"]["Bucket"]["DeletionPolicy"], "Delete");
        assert_eq!(rendered["Resources"]["Bucket"]["UpdateReplacePolicy"], "Delete");
        assert!(rendered["Resources"]["Bucket"].get("DependsOn").is_none());
    }

    #[test]
    fn test_depends_on_participates_in_graph() {
        let mut template = Template::new("test");
        template.add_resource("Bucket", bucket(json!({}))).unwrap();
        template
            .add_resource(
                "Pipeline",
                Resource::new("AWS::CodePipeline::Pipeline", json!({})).with_depends_on("Bucket"),
            )
            .unwrap();
        template.validate().unwrap();
        assert!(template.references_of("Pipeline").contains("Bucket"));
    }
}
