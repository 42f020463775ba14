//! ACM certificates with DNS validation

use crate::error::Result;
use crate::intrinsic::reference;
use crate::route53::HostedZoneRef;
use crate::template::{Construct, Resource, Template};
use serde_json::{Value, json};

/// A DNS-validated TLS certificate
///
/// Validation records are written into the referenced zone; issuance is
/// asynchronous and owned by the engine, never awaited here.
#[derive(Debug, Clone)]
pub struct Certificate {
    logical_id: String,
    domain_name: String,
    subject_alternative_names: Vec<String>,
    validation_zone: HostedZoneRef,
}

impl Certificate {
    pub fn new(
        logical_id: impl Into<String>,
        domain_name: impl Into<String>,
        validation_zone: &HostedZoneRef,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            domain_name: domain_name.into(),
            subject_alternative_names: Vec::new(),
            validation_zone: validation_zone.clone(),
        }
    }

    pub fn subject_alternative_name(mut self, name: impl Into<String>) -> Self {
        self.subject_alternative_names.push(name.into());
        self
    }
}

impl Construct for Certificate {
    type Handle = CertificateHandle;

    fn add_to(self, template: &mut Template) -> Result<CertificateHandle> {
        // one validation option per covered name, all in the same zone
        let validation_options: Vec<Value> = std::iter::once(&self.domain_name)
            .chain(self.subject_alternative_names.iter())
            .map(|name| {
                json!({
                    "DomainName": name,
                    "HostedZoneId": self.validation_zone.id,
                })
            })
            .collect();

        let mut properties = json!({
            "DomainName": self.domain_name,
            "ValidationMethod": "DNS",
            "DomainValidationOptions": validation_options,
        });
        if !self.subject_alternative_names.is_empty() {
            properties["SubjectAlternativeNames"] = json!(self.subject_alternative_names);
        }

        template.add_resource(
            &self.logical_id,
            Resource::new("AWS::CertificateManager::Certificate", properties),
        )?;
        Ok(CertificateHandle {
            logical_id: self.logical_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CertificateHandle {
    logical_id: String,
}

impl CertificateHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Certificate ARN (`Ref`)
    pub fn arn(&self) -> Value {
        reference(&self.logical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_covers_apex_and_www() {
        let zone = HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "example.com");
        let mut template = Template::new("test");
        template
            .add(
                Certificate::new("Cert", "example.com", &zone)
                    .subject_alternative_name("www.example.com"),
            )
            .unwrap();

        let properties = &template.get("Cert").unwrap().properties;
        assert_eq!(properties["DomainName"], "example.com");
        assert_eq!(properties["ValidationMethod"], "DNS");
        assert_eq!(properties["SubjectAlternativeNames"], json!(["www.example.com"]));
        assert_eq!(properties["DomainValidationOptions"][0]["HostedZoneId"], "Z0362963BNKBMPFIYIVW");
        assert_eq!(properties["DomainValidationOptions"][1]["DomainName"], "www.example.com");
    }
}
