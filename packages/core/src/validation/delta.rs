//! Delta payload identity validation
//!
//! A top-level resource or deleted resource in a delta resource set must be
//! addressable: it carries an id, or values for every key property of its
//! entity type.

use serde_json::Value;
use url::Url;

use crate::edm::EdmModel;
use crate::error::{constructors, WriteResult};
use crate::payload::ResourceProperty;

/// Check the id-or-key rule for one delta entry.
pub fn validate_delta_identity(
    model: &EdmModel,
    entity_type: Option<&str>,
    id: Option<&Url>,
    properties: &[ResourceProperty],
) -> WriteResult<()> {
    if id.is_some() {
        return Ok(());
    }
    let keys = entity_type
        .map(|t| model.key_properties(t))
        .unwrap_or_default();
    if keys.is_empty() {
        return Err(constructors::delta_resource_without_id_or_key());
    }
    let has_all_keys = keys.iter().all(|key| {
        properties
            .iter()
            .any(|p| p.name == *key && p.value != Value::Null)
    });
    if has_all_keys {
        Ok(())
    } else {
        Err(constructors::delta_resource_without_id_or_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{EdmProperty, EdmStructuredType};
    use crate::error::WriteErrorKind;
    use serde_json::json;

    fn model() -> EdmModel {
        EdmModel::new("Container").with_type(
            EdmStructuredType::entity("NS.Customer")
                .with_key(["Id"])
                .with_property(EdmProperty::structural("Id", "Edm.Int32")),
        )
    }

    fn prop(name: &str, value: Value) -> ResourceProperty {
        ResourceProperty {
            name: name.to_owned(),
            value,
        }
    }

    #[test]
    fn id_alone_satisfies_the_rule() {
        let model = model();
        let id = Url::parse("http://host/Customers(1)").unwrap();
        assert!(validate_delta_identity(&model, Some("NS.Customer"), Some(&id), &[]).is_ok());
    }

    #[test]
    fn all_key_values_satisfy_the_rule() {
        let model = model();
        let props = vec![prop("Id", json!(1))];
        assert!(validate_delta_identity(&model, Some("NS.Customer"), None, &props).is_ok());
    }

    #[test]
    fn missing_both_is_rejected() {
        let model = model();
        let err = validate_delta_identity(&model, Some("NS.Customer"), None, &[]).unwrap_err();
        assert_eq!(err.kind(), WriteErrorKind::DeltaResourceWithoutIdOrKey);

        let null_key = vec![prop("Id", Value::Null)];
        assert!(validate_delta_identity(&model, Some("NS.Customer"), None, &null_key).is_err());
    }
}
