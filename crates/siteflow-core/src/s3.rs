//! S3 bucket descriptors
//!
//! Two access postures exist in the stack: a world-readable website bucket
//! and a private bucket reachable only through a CloudFront origin access
//! identity. The posture is fixed by the builder calls, never by input data.

use crate::error::Result;
use crate::iam::PolicyDocument;
use crate::intrinsic::{get_att, reference, select, split, sub};
use crate::template::{Construct, RemovalPolicy, Resource, Template};
use serde_json::{Value, json};

/// Server-side encryption applied to new objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// S3-managed keys (SSE-S3)
    #[default]
    S3Managed,
    /// KMS-managed keys (SSE-KMS)
    KmsManaged,
}

impl Encryption {
    fn algorithm(&self) -> &'static str {
        match self {
            Encryption::S3Managed => "AES256",
            Encryption::KmsManaged => "aws:kms",
        }
    }
}

/// Public-access block configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccess {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccess {
    /// Everything blocked — the private-bucket posture
    pub const BLOCK_ALL: Self = Self {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };

    /// Nothing blocked — required for the website bucket's public policy
    pub const UNBLOCKED: Self = Self {
        block_public_acls: false,
        block_public_policy: false,
        ignore_public_acls: false,
        restrict_public_buckets: false,
    };
}

/// Version/cleanup lifecycle rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub expired_object_delete_marker: bool,
    pub abort_incomplete_multipart_after_days: u32,
    pub noncurrent_versions_to_retain: u32,
    pub noncurrent_version_expiration_days: u32,
}

impl LifecycleRule {
    fn to_value(&self) -> Value {
        json!({
            "Status": "Enabled",
            "ExpiredObjectDeleteMarker": self.expired_object_delete_marker,
            "AbortIncompleteMultipartUpload": {
                "DaysAfterInitiation": self.abort_incomplete_multipart_after_days,
            },
            "NoncurrentVersionExpiration": {
                "NoncurrentDays": self.noncurrent_version_expiration_days,
                "NewerNoncurrentVersions": self.noncurrent_versions_to_retain,
            },
        })
    }
}

/// Static website hosting configuration
#[derive(Debug, Clone)]
pub struct Website {
    pub index_document: String,
    pub error_document: String,
}

/// An object-storage bucket descriptor
#[derive(Debug, Clone)]
pub struct Bucket {
    logical_id: String,
    encryption: Encryption,
    versioned: bool,
    public_access: PublicAccess,
    public_read_access: bool,
    website: Option<Website>,
    lifecycle_rules: Vec<LifecycleRule>,
    removal_policy: Option<RemovalPolicy>,
}

impl Bucket {
    pub fn new(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            encryption: Encryption::S3Managed,
            versioned: false,
            public_access: PublicAccess::BLOCK_ALL,
            public_read_access: false,
            website: None,
            lifecycle_rules: Vec::new(),
            removal_policy: None,
        }
    }

    pub fn encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    pub fn versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    pub fn public_access(mut self, access: PublicAccess) -> Self {
        self.public_access = access;
        self
    }

    /// Attach a bucket policy granting anonymous `s3:GetObject`
    pub fn public_read_access(mut self) -> Self {
        self.public_read_access = true;
        self
    }

    pub fn website(mut self, index_document: &str, error_document: &str) -> Self {
        self.website = Some(Website {
            index_document: index_document.to_string(),
            error_document: error_document.to_string(),
        });
        self
    }

    pub fn lifecycle_rule(mut self, rule: LifecycleRule) -> Self {
        self.lifecycle_rules.push(rule);
        self
    }

    pub fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = Some(policy);
        self
    }
}

impl Construct for Bucket {
    type Handle = BucketHandle;

    fn add_to(self, template: &mut Template) -> Result<BucketHandle> {
        let mut properties = json!({
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": self.encryption.algorithm() },
                }],
            },
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": self.public_access.block_public_acls,
                "BlockPublicPolicy": self.public_access.block_public_policy,
                "IgnorePublicAcls": self.public_access.ignore_public_acls,
                "RestrictPublicBuckets": self.public_access.restrict_public_buckets,
            },
        });
        if self.versioned {
            properties["VersioningConfiguration"] = json!({ "Status": "Enabled" });
        }
        if let Some(website) = &self.website {
            properties["WebsiteConfiguration"] = json!({
                "IndexDocument": website.index_document,
                "ErrorDocument": website.error_document,
            });
        }
        if !self.lifecycle_rules.is_empty() {
            properties["LifecycleConfiguration"] = json!({
                "Rules": self.lifecycle_rules.iter().map(LifecycleRule::to_value).collect::<Vec<_>>(),
            });
        }

        let mut resource = Resource::new("AWS::S3::Bucket", properties);
        if let Some(policy) = self.removal_policy {
            resource = resource.with_removal_policy(policy);
        }
        template.add_resource(&self.logical_id, resource)?;

        let handle = BucketHandle {
            logical_id: self.logical_id,
        };
        if self.public_read_access {
            let statement = crate::iam::PolicyStatement::allow()
                .action("s3:GetObject")
                .resource(handle.objects_arn())
                .principal(json!("*"));
            let policy = BucketPolicy::new(
                format!("{}Policy", handle.logical_id),
                &handle,
                PolicyDocument::new().statement(statement),
            );
            template.add(policy)?;
        }
        Ok(handle)
    }
}

/// Standalone bucket policy, for grants decided outside the bucket builder
#[derive(Debug, Clone)]
pub struct BucketPolicy {
    logical_id: String,
    bucket: Value,
    document: PolicyDocument,
}

impl BucketPolicy {
    pub fn new(logical_id: impl Into<String>, bucket: &BucketHandle, document: PolicyDocument) -> Self {
        Self {
            logical_id: logical_id.into(),
            bucket: bucket.name(),
            document,
        }
    }
}

impl Construct for BucketPolicy {
    type Handle = ();

    fn add_to(self, template: &mut Template) -> Result<()> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::S3::BucketPolicy",
                json!({
                    "Bucket": self.bucket,
                    "PolicyDocument": self.document.to_value(),
                }),
            ),
        )
    }
}

/// Handle to a declared bucket
#[derive(Debug, Clone)]
pub struct BucketHandle {
    logical_id: String,
}

impl BucketHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Bucket name (`Ref`)
    pub fn name(&self) -> Value {
        reference(&self.logical_id)
    }

    pub fn arn(&self) -> Value {
        get_att(&self.logical_id, "Arn")
    }

    /// ARN pattern covering every object in the bucket
    pub fn objects_arn(&self) -> Value {
        sub(&format!("${{{}.Arn}}/*", self.logical_id))
    }

    pub fn regional_domain_name(&self) -> Value {
        get_att(&self.logical_id, "RegionalDomainName")
    }

    /// Website endpoint host, derived from the WebsiteURL attribute
    /// (`http://<host>` split on `/`, third element)
    pub fn website_domain(&self) -> Value {
        select(2, split("/", get_att(&self.logical_id, "WebsiteURL")))
    }
}
