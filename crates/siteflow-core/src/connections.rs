//! Source-control provider connections
//!
//! A connection is created in a pending state; an operator must complete
//! the authorization in the provider console before the pipeline's source
//! stage can run. That handshake cannot be automated here.

use crate::error::Result;
use crate::intrinsic::get_att;
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    GitHub,
    GitHubEnterpriseServer,
    Bitbucket,
    GitLab,
}

impl ProviderType {
    fn as_str(&self) -> &'static str {
        match self {
            ProviderType::GitHub => "GitHub",
            ProviderType::GitHubEnterpriseServer => "GitHubEnterpriseServer",
            ProviderType::Bitbucket => "Bitbucket",
            ProviderType::GitLab => "GitLab",
        }
    }
}

/// A pending integration handle to an external source-control provider
#[derive(Debug, Clone)]
pub struct Connection {
    logical_id: String,
    connection_name: String,
    provider_type: ProviderType,
}

impl Connection {
    pub fn new(
        logical_id: impl Into<String>,
        connection_name: impl Into<String>,
        provider_type: ProviderType,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            connection_name: connection_name.into(),
            provider_type,
        }
    }
}

impl Construct for Connection {
    type Handle = ConnectionHandle;

    fn add_to(self, template: &mut Template) -> Result<ConnectionHandle> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::CodeStarConnections::Connection",
                json!({
                    "ConnectionName": self.connection_name,
                    "ProviderType": self.provider_type.as_str(),
                }),
            ),
        )?;
        Ok(ConnectionHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    logical_id: String,
}

impl ConnectionHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn arn(&self) -> Value {
        get_att(&self.logical_id, "ConnectionArn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Template;

    #[test]
    fn test_connection_descriptor() {
        let mut template = Template::new("test");
        let connection = template
            .add(Connection::new("GithubConnection", "jekyll-static-site", ProviderType::GitHub))
            .unwrap();

        let properties = &template.get("GithubConnection").unwrap().properties;
        assert_eq!(properties["ConnectionName"], "jekyll-static-site");
        assert_eq!(properties["ProviderType"], "GitHub");
        assert_eq!(connection.arn()["Fn::GetAtt"][1], "ConnectionArn");
    }
}
