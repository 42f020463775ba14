//! CodeBuild projects running inside a pipeline

use crate::buildspec::BuildSpec;
use crate::error::Result;
use crate::iam::RoleHandle;
use crate::intrinsic::{get_att, reference};
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

const DEFAULT_IMAGE: &str = "aws/codebuild/standard:7.0";
const DEFAULT_COMPUTE_TYPE: &str = "BUILD_GENERAL1_SMALL";

/// An isolated build environment wired for pipeline artifacts
#[derive(Debug, Clone)]
pub struct Project {
    logical_id: String,
    role: RoleHandle,
    build_spec: BuildSpec,
    environment_variables: Vec<(String, Value)>,
    image: String,
    compute_type: String,
}

impl Project {
    pub fn new(logical_id: impl Into<String>, role: &RoleHandle, build_spec: BuildSpec) -> Self {
        Self {
            logical_id: logical_id.into(),
            role: role.clone(),
            build_spec,
            environment_variables: Vec::new(),
            image: DEFAULT_IMAGE.to_string(),
            compute_type: DEFAULT_COMPUTE_TYPE.to_string(),
        }
    }

    /// Plaintext environment variable; the value may be an intrinsic
    pub fn environment_variable(mut self, name: &str, value: Value) -> Self {
        self.environment_variables.push((name.to_string(), value));
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

impl Construct for Project {
    type Handle = ProjectHandle;

    fn add_to(self, template: &mut Template) -> Result<ProjectHandle> {
        let mut environment = json!({
            "Type": "LINUX_CONTAINER",
            "ComputeType": self.compute_type,
            "Image": self.image,
        });
        if !self.environment_variables.is_empty() {
            let variables: Vec<Value> = self
                .environment_variables
                .iter()
                .map(|(name, value)| {
                    json!({ "Name": name, "Type": "PLAINTEXT", "Value": value })
                })
                .collect();
            environment["EnvironmentVariables"] = Value::Array(variables);
        }

        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::CodeBuild::Project",
                json!({
                    "ServiceRole": self.role.arn(),
                    "Artifacts": { "Type": "CODEPIPELINE" },
                    "Source": {
                        "Type": "CODEPIPELINE",
                        "BuildSpec": self.build_spec.to_json()?,
                    },
                    "Environment": environment,
                }),
            ),
        )?;
        Ok(ProjectHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectHandle {
    logical_id: String,
}

impl ProjectHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Project name (`Ref`)
    pub fn name(&self) -> Value {
        reference(&self.logical_id)
    }

    pub fn arn(&self) -> Value {
        get_att(&self.logical_id, "Arn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::Role;

    #[test]
    fn test_project_embeds_buildspec_string() {
        let mut template = Template::new("test");
        let role = template
            .add(Role::new("BuildRole", "codebuild.amazonaws.com"))
            .unwrap();
        template
            .add(
                Project::new("Build", &role, BuildSpec::new().build_command("echo hi"))
                    .environment_variable("DISTRIBUTION_ID", json!({ "Ref": "Distro" })),
            )
            .unwrap();

        let properties = &template.get("Build").unwrap().properties;
        assert_eq!(properties["Artifacts"]["Type"], "CODEPIPELINE");
        assert_eq!(properties["Environment"]["ComputeType"], "BUILD_GENERAL1_SMALL");

        let spec = properties["Source"]["BuildSpec"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(spec).unwrap();
        assert_eq!(parsed["phases"]["build"]["commands"][0], "echo hi");

        let variable = &properties["Environment"]["EnvironmentVariables"][0];
        assert_eq!(variable["Name"], "DISTRIBUTION_ID");
        assert_eq!(variable["Value"]["Ref"], "Distro");
    }
}
