//! CloudFront distributions and origin access identities

use crate::acm::CertificateHandle;
use crate::error::Result;
use crate::intrinsic::{get_att, reference, sub};
use crate::s3::BucketHandle;
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

/// Fixed hosted zone id shared by every CloudFront distribution,
/// used as the alias target zone for DNS records.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Managed "CachingOptimized" cache policy
const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceClass {
    /// Lowest-cost edge locations only
    #[default]
    Class100,
    Class200,
    All,
}

impl PriceClass {
    fn as_str(&self) -> &'static str {
        match self {
            PriceClass::Class100 => "PriceClass_100",
            PriceClass::Class200 => "PriceClass_200",
            PriceClass::All => "PriceClass_All",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVersion {
    Http2,
    #[default]
    Http2And3,
}

impl HttpVersion {
    fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http2 => "http2",
            HttpVersion::Http2And3 => "http2and3",
        }
    }
}

/// Minimum viewer TLS version, applied when a custom certificate is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityPolicy {
    #[default]
    TlsV1_2_2018,
    TlsV1_2_2021,
}

impl SecurityPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            SecurityPolicy::TlsV1_2_2018 => "TLSv1.2_2018",
            SecurityPolicy::TlsV1_2_2021 => "TLSv1.2_2021",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerProtocolPolicy {
    #[default]
    RedirectToHttps,
    HttpsOnly,
    AllowAll,
}

impl ViewerProtocolPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            ViewerProtocolPolicy::RedirectToHttps => "redirect-to-https",
            ViewerProtocolPolicy::HttpsOnly => "https-only",
            ViewerProtocolPolicy::AllowAll => "allow-all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllowedMethods {
    GetHead,
    #[default]
    GetHeadOptions,
    All,
}

impl AllowedMethods {
    fn to_value(self) -> Value {
        match self {
            AllowedMethods::GetHead => json!(["GET", "HEAD"]),
            AllowedMethods::GetHeadOptions => json!(["GET", "HEAD", "OPTIONS"]),
            AllowedMethods::All => {
                json!(["GET", "HEAD", "OPTIONS", "PUT", "POST", "PATCH", "DELETE"])
            }
        }
    }
}

/// A named identity the CDN presents to a private bucket
#[derive(Debug, Clone)]
pub struct OriginAccessIdentity {
    logical_id: String,
    comment: String,
}

impl OriginAccessIdentity {
    pub fn new(logical_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            comment: comment.into(),
        }
    }
}

impl Construct for OriginAccessIdentity {
    type Handle = OaiHandle;

    fn add_to(self, template: &mut Template) -> Result<OaiHandle> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::CloudFront::CloudFrontOriginAccessIdentity",
                json!({
                    "CloudFrontOriginAccessIdentityConfig": { "Comment": self.comment },
                }),
            ),
        )?;
        Ok(OaiHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OaiHandle {
    logical_id: String,
}

impl OaiHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Identity id (`Ref`)
    pub fn id(&self) -> Value {
        reference(&self.logical_id)
    }

    /// Canonical user id, the principal for bucket-policy grants
    pub fn s3_canonical_user_id(&self) -> Value {
        get_att(&self.logical_id, "S3CanonicalUserId")
    }

    /// Path form expected by `S3OriginConfig.OriginAccessIdentity`
    pub fn origin_access_identity_path(&self) -> Value {
        sub(&format!("origin-access-identity/cloudfront/${{{}}}", self.logical_id))
    }
}

/// Storage origin of a distribution — exactly one per distribution
#[derive(Debug, Clone)]
pub enum Origin {
    /// Website-endpoint origin on a public, website-configured bucket
    S3Website { bucket: BucketHandle },
    /// REST origin on a private bucket, read through an access identity
    S3Private {
        bucket: BucketHandle,
        identity: OaiHandle,
    },
}

impl Origin {
    pub fn s3_website(bucket: &BucketHandle) -> Self {
        Origin::S3Website {
            bucket: bucket.clone(),
        }
    }

    pub fn s3_private(bucket: &BucketHandle, identity: &OaiHandle) -> Self {
        Origin::S3Private {
            bucket: bucket.clone(),
            identity: identity.clone(),
        }
    }

    fn to_value(&self, origin_id: &str) -> Value {
        match self {
            Origin::S3Website { bucket } => json!({
                "Id": origin_id,
                "DomainName": bucket.website_domain(),
                "CustomOriginConfig": { "OriginProtocolPolicy": "http-only" },
            }),
            Origin::S3Private { bucket, identity } => json!({
                "Id": origin_id,
                "DomainName": bucket.regional_domain_name(),
                "S3OriginConfig": {
                    "OriginAccessIdentity": identity.origin_access_identity_path(),
                },
            }),
        }
    }
}

/// A content-delivery distribution fronting one storage origin
#[derive(Debug, Clone)]
pub struct Distribution {
    logical_id: String,
    enabled: bool,
    comment: Option<String>,
    aliases: Vec<String>,
    certificate: Option<CertificateHandle>,
    minimum_protocol: SecurityPolicy,
    price_class: PriceClass,
    http_version: HttpVersion,
    default_root_object: Option<String>,
    viewer_protocol_policy: ViewerProtocolPolicy,
    allowed_methods: AllowedMethods,
    origin: Origin,
}

impl Distribution {
    pub fn new(logical_id: impl Into<String>, origin: Origin) -> Self {
        Self {
            logical_id: logical_id.into(),
            enabled: true,
            comment: None,
            aliases: Vec::new(),
            certificate: None,
            minimum_protocol: SecurityPolicy::default(),
            price_class: PriceClass::default(),
            http_version: HttpVersion::default(),
            default_root_object: None,
            viewer_protocol_policy: ViewerProtocolPolicy::default(),
            allowed_methods: AllowedMethods::default(),
            origin,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Attach a custom certificate; without one the distribution serves on
    /// the default CloudFront certificate and hostname only.
    pub fn certificate(mut self, certificate: &CertificateHandle) -> Self {
        self.certificate = Some(certificate.clone());
        self
    }

    pub fn minimum_protocol(mut self, policy: SecurityPolicy) -> Self {
        self.minimum_protocol = policy;
        self
    }

    pub fn price_class(mut self, price_class: PriceClass) -> Self {
        self.price_class = price_class;
        self
    }

    pub fn http_version(mut self, http_version: HttpVersion) -> Self {
        self.http_version = http_version;
        self
    }

    pub fn default_root_object(mut self, object: impl Into<String>) -> Self {
        self.default_root_object = Some(object.into());
        self
    }

    pub fn viewer_protocol_policy(mut self, policy: ViewerProtocolPolicy) -> Self {
        self.viewer_protocol_policy = policy;
        self
    }

    pub fn allowed_methods(mut self, methods: AllowedMethods) -> Self {
        self.allowed_methods = methods;
        self
    }
}

impl Construct for Distribution {
    type Handle = DistributionHandle;

    fn add_to(self, template: &mut Template) -> Result<DistributionHandle> {
        let origin_id = format!("{}Origin", self.logical_id);
        let viewer_certificate = match &self.certificate {
            Some(certificate) => json!({
                "AcmCertificateArn": certificate.arn(),
                "SslSupportMethod": "sni-only",
                "MinimumProtocolVersion": self.minimum_protocol.as_str(),
            }),
            None => json!({ "CloudFrontDefaultCertificate": true }),
        };

        let mut config = json!({
            "Enabled": self.enabled,
            "PriceClass": self.price_class.as_str(),
            "HttpVersion": self.http_version.as_str(),
            "Origins": [self.origin.to_value(&origin_id)],
            "DefaultCacheBehavior": {
                "TargetOriginId": origin_id,
                "ViewerProtocolPolicy": self.viewer_protocol_policy.as_str(),
                "AllowedMethods": self.allowed_methods.to_value(),
                "CachedMethods": ["GET", "HEAD"],
                "Compress": true,
                "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
            },
            "ViewerCertificate": viewer_certificate,
        });
        if let Some(comment) = &self.comment {
            config["Comment"] = json!(comment);
        }
        if !self.aliases.is_empty() {
            config["Aliases"] = json!(self.aliases);
        }
        if let Some(object) = &self.default_root_object {
            config["DefaultRootObject"] = json!(object);
        }

        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::CloudFront::Distribution",
                json!({ "DistributionConfig": config }),
            ),
        )?;
        Ok(DistributionHandle {
            logical_id: self.logical_id,
        })
    }
}

/// Handle to a declared distribution
#[derive(Debug, Clone)]
pub struct DistributionHandle {
    logical_id: String,
}

impl DistributionHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Provider-assigned distribution id (`Ref`)
    pub fn id(&self) -> Value {
        reference(&self.logical_id)
    }

    /// Default `*.cloudfront.net` hostname
    pub fn domain_name(&self) -> Value {
        get_att(&self.logical_id, "DomainName")
    }

    /// Distribution ARN for the current account
    pub fn arn(&self) -> Value {
        sub(&format!(
            "arn:aws:cloudfront::${{AWS::AccountId}}:distribution/${{{}}}",
            self.logical_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acm::Certificate;
    use crate::route53::HostedZoneRef;
    use crate::s3::{Bucket, PublicAccess};

    #[test]
    fn test_website_distribution_with_certificate() {
        let mut template = Template::new("test");
        let bucket = template
            .add(
                Bucket::new("Site")
                    .public_access(PublicAccess::UNBLOCKED)
                    .public_read_access()
                    .website("index.html", "404.html"),
            )
            .unwrap();
        let zone = HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "example.com");
        let cert = template
            .add(Certificate::new("Cert", "example.com", &zone).subject_alternative_name("www.example.com"))
            .unwrap();
        template
            .add(
                Distribution::new("Distro", Origin::s3_website(&bucket))
                    .comment("static site")
                    .alias("example.com")
                    .alias("www.example.com")
                    .certificate(&cert)
                    .default_root_object("index.html"),
            )
            .unwrap();

        let config = &template.get("Distro").unwrap().properties["DistributionConfig"];
        assert_eq!(config["Enabled"], true);
        assert_eq!(config["PriceClass"], "PriceClass_100");
        assert_eq!(config["HttpVersion"], "http2and3");
        assert_eq!(config["Aliases"], json!(["example.com", "www.example.com"]));
        assert_eq!(config["ViewerCertificate"]["MinimumProtocolVersion"], "TLSv1.2_2018");
        assert_eq!(config["DefaultCacheBehavior"]["ViewerProtocolPolicy"], "redirect-to-https");
        assert_eq!(config["DefaultCacheBehavior"]["AllowedMethods"], json!(["GET", "HEAD", "OPTIONS"]));
        assert_eq!(config["Origins"][0]["CustomOriginConfig"]["OriginProtocolPolicy"], "http-only");
        template.validate().unwrap();
    }

    #[test]
    fn test_private_distribution_uses_identity() {
        let mut template = Template::new("test");
        let bucket = template.add(Bucket::new("Media").versioned(true)).unwrap();
        let oai = template
            .add(OriginAccessIdentity::new("Oai", "media access"))
            .unwrap();
        template
            .add(Distribution::new("MediaDistro", Origin::s3_private(&bucket, &oai)))
            .unwrap();

        let config = &template.get("MediaDistro").unwrap().properties["DistributionConfig"];
        assert_eq!(config["ViewerCertificate"]["CloudFrontDefaultCertificate"], true);
        assert!(config.get("Aliases").is_none());
        let origin = &config["Origins"][0];
        assert_eq!(origin["DomainName"]["Fn::GetAtt"][1], "RegionalDomainName");
        assert_eq!(
            origin["S3OriginConfig"]["OriginAccessIdentity"]["Fn::Sub"],
            "origin-access-identity/cloudfront/${Oai}"
        );
        template.validate().unwrap();
    }

    #[test]
    fn test_distribution_arn_is_account_scoped() {
        let handle = DistributionHandle {
            logical_id: "Distro".to_string(),
        };
        assert_eq!(
            handle.arn()["Fn::Sub"],
            "arn:aws:cloudfront::${AWS::AccountId}:distribution/${Distro}"
        );
    }
}
