//! Inline build specifications
//!
//! A two-phase spec (install, build) plus an output artifact file-set,
//! serialized to the JSON string the build environment consumes.

use crate::error::Result;
use serde_json::{Value, json};

const BUILDSPEC_VERSION: &str = "0.2";

/// Output artifact file-set of a build
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub files: Vec<String>,
    pub base_directory: Option<String>,
    pub name: Option<String>,
}

impl ArtifactSpec {
    fn to_value(&self) -> Value {
        let mut value = json!({ "files": self.files });
        if let Some(base_directory) = &self.base_directory {
            value["base-directory"] = json!(base_directory);
        }
        if let Some(name) = &self.name {
            value["name"] = json!(name);
        }
        value
    }
}

/// A two-phase inline buildspec
#[derive(Debug, Clone, Default)]
pub struct BuildSpec {
    install_commands: Vec<String>,
    build_commands: Vec<String>,
    artifacts: Option<ArtifactSpec>,
}

impl BuildSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_command(mut self, command: &str) -> Self {
        self.install_commands.push(command.to_string());
        self
    }

    pub fn build_command(mut self, command: &str) -> Self {
        self.build_commands.push(command.to_string());
        self
    }

    pub fn artifacts(mut self, artifacts: ArtifactSpec) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut phases = json!({});
        if !self.install_commands.is_empty() {
            phases["install"] = json!({ "commands": self.install_commands });
        }
        if !self.build_commands.is_empty() {
            phases["build"] = json!({ "commands": self.build_commands });
        }
        let mut value = json!({
            "version": BUILDSPEC_VERSION,
            "phases": phases,
        });
        if let Some(artifacts) = &self.artifacts {
            value["artifacts"] = artifacts.to_value();
        }
        value
    }

    /// The JSON string form embedded in a build project
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}
