//! The single construction pass assembling the blog resource graph

use crate::jekyll;
use serde_json::json;
use siteflow_config::StackConfig;
use siteflow_core::acm::Certificate;
use siteflow_core::cloudfront::{
    AllowedMethods, Distribution, HttpVersion, Origin, OriginAccessIdentity, PriceClass,
    SecurityPolicy, ViewerProtocolPolicy,
};
use siteflow_core::codebuild::Project;
use siteflow_core::codepipeline::{Action, Artifact, Pipeline, Stage};
use siteflow_core::connections::{Connection, ProviderType};
use siteflow_core::iam::{PolicyDocument, PolicyStatement, Role};
use siteflow_core::intrinsic::sub;
use siteflow_core::notifications::{NotificationRule, Topic, TopicPolicy};
use siteflow_core::route53::AliasRecord;
use siteflow_core::s3::{Bucket, BucketHandle, BucketPolicy, LifecycleRule, PublicAccess};
use siteflow_core::{HostedZoneRef, RemovalPolicy, Result, Template};

const CONNECTION_NAME: &str = "jekyll-static-site";
const PIPELINE_NAME: &str = "static-blog";

/// The lifecycle policy shared by both origin buckets
fn origin_lifecycle_rule() -> LifecycleRule {
    LifecycleRule {
        expired_object_delete_marker: true,
        abort_incomplete_multipart_after_days: 10,
        noncurrent_versions_to_retain: 5,
        noncurrent_version_expiration_days: 60,
    }
}

/// Build the complete blog hosting template
///
/// `zone` is the pre-existing hosted zone for the base domain, resolved by
/// the caller (engine lookup or explicit id). Construction is synchronous
/// and side-effect free; the returned template has passed graph validation.
pub fn blog_stack(config: &StackConfig, zone: &HostedZoneRef) -> Result<Template> {
    let mut template = Template::new(format!("Static blog hosting for {}", config.domain_name));

    // Origin storage. The two access postures are fixed here and never
    // depend on input: the site bucket serves the web, the media bucket
    // only ever answers to the access identity.
    let static_bucket = template.add(
        Bucket::new("StaticSiteBucket")
            .versioned(true)
            .public_access(PublicAccess::UNBLOCKED)
            .public_read_access()
            .website("index.html", "404.html")
            .lifecycle_rule(origin_lifecycle_rule())
            .removal_policy(RemovalPolicy::Destroy),
    )?;
    let media_bucket = template.add(
        Bucket::new("MediaBucket")
            .versioned(true)
            .lifecycle_rule(origin_lifecycle_rule())
            .removal_policy(RemovalPolicy::Destroy),
    )?;

    // Certificate for the apex and the www alias, validated in the zone
    let certificate = template.add(
        Certificate::new("StaticSiteCert", &config.domain_name, zone)
            .subject_alternative_name(config.www_domain()),
    )?;

    // Access identity plus the grant letting it read the media bucket
    let identity = template.add(OriginAccessIdentity::new(
        "MediaAccessIdentity",
        "access to static site media bucket",
    ))?;
    template.add(BucketPolicy::new(
        "MediaBucketPolicy",
        &media_bucket,
        PolicyDocument::new().statement(
            PolicyStatement::allow()
                .action("s3:GetObject")
                .resource(media_bucket.objects_arn())
                .principal(json!({ "CanonicalUser": identity.s3_canonical_user_id() })),
        ),
    ))?;

    // Distributions: the public one carries the certificate and both
    // aliases, the media one stays on its provider-assigned hostname.
    let static_distribution = template.add(
        Distribution::new("StaticDistribution", Origin::s3_website(&static_bucket))
            .comment("Distro to host the static site")
            .alias(&config.domain_name)
            .alias(config.www_domain())
            .certificate(&certificate)
            .default_root_object("index.html")
            .price_class(PriceClass::Class100)
            .http_version(HttpVersion::Http2And3)
            .minimum_protocol(SecurityPolicy::TlsV1_2_2018)
            .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
            .allowed_methods(AllowedMethods::GetHeadOptions),
    )?;
    let media_distribution = template.add(
        Distribution::new("MediaDistribution", Origin::s3_private(&media_bucket, &identity))
            .comment("Distro to host the media for the static site")
            .default_root_object("index.html")
            .price_class(PriceClass::Class100)
            .http_version(HttpVersion::Http2And3)
            .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
            .allowed_methods(AllowedMethods::GetHeadOptions),
    )?;

    // Apex and www alias records, both at the static distribution
    template.add(AliasRecord::new(
        "ApexAliasRecord",
        zone,
        &config.domain_name,
        &static_distribution,
    ))?;
    template.add(AliasRecord::new(
        "WwwAliasRecord",
        zone,
        config.www_domain(),
        &static_distribution,
    ))?;

    // Source connection, created pending; authorization is a console step
    let connection = template.add(Connection::new(
        "GithubConnection",
        CONNECTION_NAME,
        ProviderType::GitHub,
    ))?;

    // Pipeline plumbing: artifact store and service roles
    let artifact_bucket = template.add(
        Bucket::new("PipelineArtifactsBucket").removal_policy(RemovalPolicy::Destroy),
    )?;
    let build_role = template.add(
        Role::new("BuildProjectRole", "codebuild.amazonaws.com")
            .inline_policy("BuildProjectPolicy", codebuild_base_policy(&artifact_bucket)),
    )?;
    let invalidate_role = template.add(
        Role::new("InvalidateProjectRole", "codebuild.amazonaws.com")
            .inline_policy("InvalidateProjectPolicy", codebuild_base_policy(&artifact_bucket))
            .inline_policy(
                "StaticDistributionInvalidation",
                PolicyDocument::new().statement(
                    PolicyStatement::allow()
                        .action("cloudfront:CreateInvalidation")
                        .resource(static_distribution.arn()),
                ),
            ),
    )?;

    let build_project = template.add(Project::new(
        "BuildJekyllSite",
        &build_role,
        jekyll::build_spec(),
    ))?;
    let invalidate_project = template.add(
        Project::new(
            "CloudFrontInvalidateProject",
            &invalidate_role,
            jekyll::invalidation_spec(),
        )
        .environment_variable("DISTRIBUTION_ID", static_distribution.id()),
    )?;

    let pipeline_role = template.add(
        Role::new("PipelineRole", "codepipeline.amazonaws.com").inline_policy(
            "PipelinePolicy",
            PolicyDocument::new()
                .statement(
                    PolicyStatement::allow()
                        .actions(&[
                            "s3:GetObject",
                            "s3:GetObjectVersion",
                            "s3:GetBucketVersioning",
                            "s3:PutObject",
                        ])
                        .resource(artifact_bucket.arn())
                        .resource(artifact_bucket.objects_arn()),
                )
                .statement(
                    PolicyStatement::allow()
                        .action("codestar-connections:UseConnection")
                        .resource(connection.arn()),
                )
                .statement(
                    PolicyStatement::allow()
                        .actions(&["codebuild:StartBuild", "codebuild:BatchGetBuilds"])
                        .resource(build_project.arn())
                        .resource(invalidate_project.arn()),
                )
                .statement(
                    PolicyStatement::allow()
                        .actions(&[
                            "s3:GetBucketLocation",
                            "s3:ListBucket",
                            "s3:PutObject",
                            "s3:DeleteObject",
                        ])
                        .resource(static_bucket.arn())
                        .resource(static_bucket.objects_arn()),
                ),
        ),
    )?;

    // The pipeline itself: four stages in fixed order, one artifact handed
    // from Source to Build, the build artifact consumed by Deploy and the
    // invalidation stage.
    let source_artifact = Artifact::new("SourceArtifact");
    let build_artifact = Artifact::new("BuildArtifact");
    let pipeline = template.add(
        Pipeline::new("Pipeline", &pipeline_role, &artifact_bucket)
            .pipeline_name(PIPELINE_NAME)
            .stage(Stage::new("Source").action(Action::CodeStarSource {
                action_name: "Github-Source".to_string(),
                connection: connection.clone(),
                owner: config.repo_owner.clone(),
                repo: config.repo_name.clone(),
                branch: config.repo_branch.clone(),
                output: source_artifact.clone(),
                run_order: 1,
            }))
            .stage(Stage::new("Build-Site").action(Action::CodeBuild {
                action_name: "Build-Static-Site".to_string(),
                project: build_project.clone(),
                input: source_artifact,
                outputs: vec![build_artifact.clone()],
                run_order: 1,
            }))
            .stage(Stage::new("Deploy-Site").action(Action::S3Deploy {
                action_name: "Deploy-To-S3".to_string(),
                bucket: static_bucket.clone(),
                input: build_artifact.clone(),
                run_order: 1,
            }))
            .stage(Stage::new("Update-Cloudfront").action(Action::CodeBuild {
                action_name: "Invalidate-CloudFront".to_string(),
                project: invalidate_project.clone(),
                input: build_artifact,
                outputs: Vec::new(),
                run_order: 1,
            }))
            .removal_policy(RemovalPolicy::Destroy),
    )?;

    // Optional observer on pipeline state transitions
    if config.notifications {
        let topic = template.add(Topic::new(
            "DeploymentTopic",
            "jekyll-blog-deployment",
            "jekyll-blog-deployment",
        ))?;
        template.add(TopicPolicy::new("DeploymentTopicPolicy", &topic))?;
        template.add(NotificationRule::new(
            "DeploymentNotificationRule",
            "jekyll-blog-deployment",
            &pipeline,
            &topic,
        ))?;
    }

    template.add_output(
        "ConnectionArn",
        "Pending connection; complete the authorization in the console before the first pipeline run",
        connection.arn(),
    );
    template.add_output("StaticSiteBucketName", "Origin bucket for the site", static_bucket.name());
    template.add_output("StaticDistributionId", "Distribution serving the site", static_distribution.id());
    template.add_output(
        "StaticDistributionDomain",
        "CloudFront hostname of the site distribution",
        static_distribution.domain_name(),
    );
    template.add_output(
        "MediaDistributionDomain",
        "CloudFront hostname of the media distribution",
        media_distribution.domain_name(),
    );
    template.add_output("CertificateArn", "Site certificate", certificate.arn());
    template.add_output("PipelineName", "Build and deploy pipeline", pipeline.name());

    template.validate()?;
    Ok(template)
}

/// Logs and artifact-store access every build project needs
fn codebuild_base_policy(artifact_bucket: &BucketHandle) -> PolicyDocument {
    PolicyDocument::new()
        .statement(
            PolicyStatement::allow()
                .actions(&["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"])
                .resource(sub(
                    "arn:aws:logs:${AWS::Region}:${AWS::AccountId}:log-group:/aws/codebuild/*",
                )),
        )
        .statement(
            PolicyStatement::allow()
                .actions(&["s3:GetObject", "s3:GetObjectVersion", "s3:PutObject"])
                .resource(artifact_bucket.objects_arn()),
        )
        .statement(
            PolicyStatement::allow()
                .actions(&["s3:GetBucketAcl", "s3:GetBucketLocation"])
                .resource(artifact_bucket.arn()),
        )
}
