//! Binary tests for the pure (offline) subcommands

use assert_cmd::Command;
use predicates::prelude::*;

fn site() -> Command {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.env("AWS_ACCOUNT_NUMBER", "123456789012")
        .env("AWS_REGION", "us-east-1")
        .env("DOMAIN_NAME", "example.com")
        .env("BASE_DOMAIN", "example.com")
        .env("REPO_OWNER", "octocat")
        .env("REPO_NAME", "blog")
        .env("REPO_BRANCH", "main")
        .env_remove("SITEFLOW_STACK_NAME")
        .env_remove("SITEFLOW_ZONE_ID")
        .env_remove("SITEFLOW_NOTIFICATIONS");
    cmd
}

#[test]
fn synth_renders_the_template() {
    site()
        .args(["synth", "--zone-id", "Z0362963BNKBMPFIYIVW"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AWS::CloudFront::Distribution"))
        .stdout(predicate::str::contains("StaticSiteBucket"))
        .stdout(predicate::str::contains("Z0362963BNKBMPFIYIVW"));
}

#[test]
fn validate_reports_resource_counts() {
    site()
        .args(["validate", "--zone-id", "Z0362963BNKBMPFIYIVW"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AWS::CodePipeline::Pipeline"))
        .stdout(predicate::str::contains("AWS::S3::Bucket"));
}

#[test]
fn missing_configuration_is_reported_by_name() {
    site()
        .env_remove("DOMAIN_NAME")
        .args(["synth", "--zone-id", "Z0362963BNKBMPFIYIVW"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOMAIN_NAME"));
}

#[test]
fn mismatched_domains_are_rejected_locally() {
    site()
        .env("DOMAIN_NAME", "example.org")
        .args(["synth", "--zone-id", "Z0362963BNKBMPFIYIVW"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not covered by base domain"));
}
