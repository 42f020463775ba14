//! CloudFormation intrinsic function helpers
//!
//! Small constructors for the intrinsics the stack uses, plus reference
//! extraction so the template can validate its dependency graph before
//! anything is submitted to the engine.

use serde_json::{Value, json};
use std::collections::BTreeSet;

/// `{"Ref": logical_id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Sub": template}`
///
/// `${Name}` and `${Name.Attr}` substitute resources; `${AWS::*}` pseudo
/// parameters and `${!Literal}` escapes pass through to CloudFormation.
pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// `{"Fn::Select": [index, list]}`
pub fn select(index: u32, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// `{"Fn::Split": [delimiter, source]}`
pub fn split(delimiter: &str, source: Value) -> Value {
    json!({ "Fn::Split": [delimiter, source] })
}

/// Collect every logical id referenced by `value` through Ref, Fn::GetAtt
/// or Fn::Sub, recursing into nested structures.
pub fn collect_references(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(target) = map.get("Ref") {
                    if let Some(name) = target.as_str() {
                        if !name.starts_with("AWS::") {
                            out.insert(name.to_string());
                        }
                        return;
                    }
                }
                if let Some(target) = map.get("Fn::GetAtt") {
                    match target {
                        Value::Array(parts) => {
                            if let Some(name) = parts.first().and_then(Value::as_str) {
                                out.insert(name.to_string());
                            }
                        }
                        Value::String(dotted) => {
                            if let Some((name, _)) = dotted.split_once('.') {
                                out.insert(name.to_string());
                            }
                        }
                        _ => {}
                    }
                    return;
                }
                if let Some(target) = map.get("Fn::Sub") {
                    match target {
                        Value::String(template) => {
                            collect_sub_references(template, &[], out);
                        }
                        Value::Array(parts) => {
                            // [template, {locals}] — local names shadow resources
                            let locals: Vec<&str> = parts
                                .get(1)
                                .and_then(Value::as_object)
                                .map(|m| m.keys().map(String::as_str).collect())
                                .unwrap_or_default();
                            if let Some(template) = parts.first().and_then(Value::as_str) {
                                collect_sub_references(template, &locals, out);
                            }
                            if let Some(Value::Object(vars)) = parts.get(1) {
                                for var in vars.values() {
                                    collect_references(var, out);
                                }
                            }
                        }
                        _ => {}
                    }
                    return;
                }
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

fn collect_sub_references(template: &str, locals: &[&str], out: &mut BTreeSet<String>) {
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        rest = &rest[start + 2..];
        let Some(end) = rest.find('}') else { break };
        let token = &rest[..end];
        rest = &rest[end + 1..];
        // ${!x} is a literal, ${AWS::x} is a pseudo parameter
        if token.starts_with('!') || token.contains("::") {
            continue;
        }
        let name = token.split('.').next().unwrap_or(token);
        if !name.is_empty() && !locals.contains(&name) {
            out.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(value: &Value) -> Vec<String> {
        let mut out = BTreeSet::new();
        collect_references(value, &mut out);
        out.into_iter().collect()
    }

    #[test]
    fn test_ref_and_get_att() {
        assert_eq!(refs(&reference("Bucket")), vec!["Bucket"]);
        assert_eq!(refs(&get_att("Distro", "DomainName")), vec!["Distro"]);
    }

    #[test]
    fn test_pseudo_parameters_are_not_references() {
        assert!(refs(&reference("AWS::Region")).is_empty());
        assert!(refs(&sub("arn:aws:s3:::${AWS::AccountId}-bucket")).is_empty());
    }

    #[test]
    fn test_sub_extracts_resource_names() {
        let value = sub("arn:aws:cloudfront::${AWS::AccountId}:distribution/${Distro}");
        assert_eq!(refs(&value), vec!["Distro"]);

        // dotted form targets the resource, literal form targets nothing
        assert_eq!(refs(&sub("${Bucket.Arn}/*")), vec!["Bucket"]);
        assert!(refs(&sub("${!NotARef}")).is_empty());
    }

    #[test]
    fn test_sub_locals_shadow_resources() {
        let value = json!({ "Fn::Sub": ["${Host}/${Path}", { "Host": { "Ref": "Bucket" } }] });
        assert_eq!(refs(&value), vec!["Bucket", "Path"]);
    }

    #[test]
    fn test_nested_structures() {
        let value = json!({
            "Stages": [
                { "Configuration": { "ProjectName": { "Ref": "BuildProject" } } },
                { "Configuration": { "ConnectionArn": { "Fn::GetAtt": ["Connection", "ConnectionArn"] } } },
            ]
        });
        assert_eq!(refs(&value), vec!["BuildProject", "Connection"]);
    }
}
