//! Route 53 zone references and alias records

use crate::cloudfront::{CLOUDFRONT_HOSTED_ZONE_ID, DistributionHandle};
use crate::error::Result;
use crate::template::{Construct, Resource, Template};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Reference to a pre-existing hosted zone
///
/// The zone is never owned or mutated by the stack; it is resolved by name
/// through the engine (or supplied directly) and carried into certificate
/// validation and record creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneRef {
    /// Zone id, without the `/hostedzone/` prefix
    pub id: String,
    /// Zone apex name, without the trailing dot
    pub name: String,
}

impl HostedZoneRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            name: name.trim_end_matches('.').to_string(),
        }
    }
}

/// An alias A record pointing a hostname at a distribution
#[derive(Debug, Clone)]
pub struct AliasRecord {
    logical_id: String,
    zone: HostedZoneRef,
    record_name: String,
    target: DistributionHandle,
}

impl AliasRecord {
    pub fn new(
        logical_id: impl Into<String>,
        zone: &HostedZoneRef,
        record_name: impl Into<String>,
        target: &DistributionHandle,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            zone: zone.clone(),
            record_name: record_name.into(),
            target: target.clone(),
        }
    }
}

impl Construct for AliasRecord {
    type Handle = ();

    fn add_to(self, template: &mut Template) -> Result<()> {
        template.add_resource(
            &self.logical_id,
            Resource::new(
                "AWS::Route53::RecordSet",
                json!({
                    "HostedZoneId": self.zone.id,
                    "Name": format!("{}.", self.record_name.trim_end_matches('.')),
                    "Type": "A",
                    "AliasTarget": {
                        "DNSName": self.target.domain_name(),
                        "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
                    },
                }),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudfront::{Distribution, Origin};
    use crate::s3::Bucket;

    #[test]
    fn test_zone_ref_normalizes_trailing_dot() {
        let zone = HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "example.com.");
        assert_eq!(zone.name, "example.com");
    }

    #[test]
    fn test_alias_record_targets_distribution() {
        let mut template = Template::new("test");
        let bucket = template
            .add(Bucket::new("Site").website("index.html", "404.html"))
            .unwrap();
        let distro = template
            .add(Distribution::new("Distro", Origin::s3_website(&bucket)))
            .unwrap();

        let zone = HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "example.com");
        template
            .add(AliasRecord::new("ApexRecord", &zone, "example.com", &distro))
            .unwrap();

        let record = &template.get("ApexRecord").unwrap().properties;
        assert_eq!(record["Name"], "example.com.");
        assert_eq!(record["Type"], "A");
        assert_eq!(record["AliasTarget"]["HostedZoneId"], CLOUDFRONT_HOSTED_ZONE_ID);
        assert_eq!(record["AliasTarget"]["DNSName"]["Fn::GetAtt"][0], "Distro");
        template.validate().unwrap();
    }
}
