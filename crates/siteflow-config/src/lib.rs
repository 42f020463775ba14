//! Stack configuration, sourced from the environment
//!
//! The same variables the original deployment consumed drive the stack:
//! account, region, the site and base domains, and the repository
//! coordinates. Everything is validated locally before any engine call so
//! that a bad configuration never reaches the provisioning API.

pub mod error;

pub use error::{ConfigError, Result};

use serde::{Deserialize, Serialize};

const DEFAULT_STACK_NAME: &str = "jekyll-static-blog";

/// Complete input configuration of the blog stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// CloudFormation stack name (`SITEFLOW_STACK_NAME`)
    pub stack_name: String,

    /// Twelve-digit account id (`AWS_ACCOUNT_NUMBER`)
    pub account: String,

    /// Deployment region (`AWS_REGION`)
    pub region: String,

    /// Site apex domain (`DOMAIN_NAME`)
    pub domain_name: String,

    /// Parent domain owning the hosted zone (`BASE_DOMAIN`)
    pub base_domain: String,

    /// Source repository owner (`REPO_OWNER`)
    pub repo_owner: String,

    /// Source repository name (`REPO_NAME`)
    pub repo_name: String,

    /// Branch that triggers the pipeline (`REPO_BRANCH`)
    pub repo_branch: String,

    /// Pre-resolved hosted zone id, skipping the lookup (`SITEFLOW_ZONE_ID`)
    pub zone_id: Option<String>,

    /// Attach the deployment notification observer (`SITEFLOW_NOTIFICATIONS`)
    pub notifications: bool,
}

impl StackConfig {
    /// Load and validate the configuration from the environment
    pub fn from_env() -> Result<Self> {
        let config = Self {
            stack_name: optional("SITEFLOW_STACK_NAME").unwrap_or_else(|| DEFAULT_STACK_NAME.to_string()),
            account: required("AWS_ACCOUNT_NUMBER")?,
            region: required("AWS_REGION")?,
            domain_name: required("DOMAIN_NAME")?,
            base_domain: required("BASE_DOMAIN")?,
            repo_owner: required("REPO_OWNER")?,
            repo_name: required("REPO_NAME")?,
            repo_branch: required("REPO_BRANCH")?,
            zone_id: optional("SITEFLOW_ZONE_ID"),
            notifications: optional("SITEFLOW_NOTIFICATIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency without touching the environment
    pub fn validate(&self) -> Result<()> {
        if !self.account.chars().all(|c| c.is_ascii_digit()) || self.account.len() != 12 {
            return Err(ConfigError::InvalidValue {
                name: "AWS_ACCOUNT_NUMBER".to_string(),
                reason: "expected a twelve-digit account id".to_string(),
            });
        }
        for (name, value) in [
            ("DOMAIN_NAME", &self.domain_name),
            ("BASE_DOMAIN", &self.base_domain),
        ] {
            if value.is_empty() || value.starts_with('.') || value.ends_with('.') {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("{value:?} is not a valid domain name"),
                });
            }
        }
        let covered = self.domain_name == self.base_domain
            || self.domain_name.ends_with(&format!(".{}", self.base_domain));
        if !covered {
            return Err(ConfigError::DomainMismatch {
                domain: self.domain_name.clone(),
                base_domain: self.base_domain.clone(),
            });
        }
        Ok(())
    }

    /// The `www` alias of the site domain
    pub fn www_domain(&self) -> String {
        format!("www.{}", self.domain_name)
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const BASE_VARS: [(&str, Option<&str>); 8] = [
        ("AWS_ACCOUNT_NUMBER", Some("123456789012")),
        ("AWS_REGION", Some("us-east-1")),
        ("DOMAIN_NAME", Some("example.com")),
        ("BASE_DOMAIN", Some("example.com")),
        ("REPO_OWNER", Some("octocat")),
        ("REPO_NAME", Some("blog")),
        ("REPO_BRANCH", Some("main")),
        ("SITEFLOW_STACK_NAME", None),
    ];

    #[test]
    #[serial]
    fn test_from_env_with_complete_environment() {
        temp_env::with_vars(BASE_VARS, || {
            let config = StackConfig::from_env().unwrap();
            assert_eq!(config.stack_name, "jekyll-static-blog");
            assert_eq!(config.domain_name, "example.com");
            assert_eq!(config.www_domain(), "www.example.com");
            assert!(!config.notifications);
            assert!(config.zone_id.is_none());
        });
    }

    #[test]
    #[serial]
    fn test_missing_variable_is_named() {
        let mut vars: Vec<(&str, Option<&str>)> = BASE_VARS.to_vec();
        vars[2] = ("DOMAIN_NAME", None);
        temp_env::with_vars(vars, || {
            let err = StackConfig::from_env().unwrap_err();
            match err {
                ConfigError::MissingEnvVar(name) => assert_eq!(name, "DOMAIN_NAME"),
                other => panic!("unexpected error: {other}"),
            }
        });
    }

    #[test]
    #[serial]
    fn test_subdomain_of_base_domain_accepted() {
        let mut vars: Vec<(&str, Option<&str>)> = BASE_VARS.to_vec();
        vars[2] = ("DOMAIN_NAME", Some("blog.example.com"));
        temp_env::with_vars(vars, || {
            let config = StackConfig::from_env().unwrap();
            assert_eq!(config.www_domain(), "www.blog.example.com");
        });
    }

    #[test]
    #[serial]
    fn test_unrelated_domain_rejected() {
        let mut vars: Vec<(&str, Option<&str>)> = BASE_VARS.to_vec();
        vars[2] = ("DOMAIN_NAME", Some("example.org"));
        temp_env::with_vars(vars, || {
            let err = StackConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::DomainMismatch { .. }));
        });
    }

    #[test]
    #[serial]
    fn test_bad_account_number_rejected() {
        let mut vars: Vec<(&str, Option<&str>)> = BASE_VARS.to_vec();
        vars[0] = ("AWS_ACCOUNT_NUMBER", Some("not-a-number"));
        temp_env::with_vars(vars, || {
            let err = StackConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        });
    }

    #[test]
    #[serial]
    fn test_notifications_opt_in() {
        let mut vars: Vec<(&str, Option<&str>)> = BASE_VARS.to_vec();
        vars.push(("SITEFLOW_NOTIFICATIONS", Some("true")));
        temp_env::with_vars(vars, || {
            let config = StackConfig::from_env().unwrap();
            assert!(config.notifications);
        });
    }
}
