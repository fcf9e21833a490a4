//! Resource set element type validation
//!
//! A set scope enforces one element type across all its resources: either
//! assignability to the declared element type, or - when nothing is
//! declared - identity with the first resource written.

use crate::edm::EdmModel;
use crate::error::{constructors, WriteResult};

/// Enforces a single element type across one resource set
#[derive(Debug, Default)]
pub struct ResourceSetValidator {
    declared_element_type: Option<String>,
    first_seen: Option<String>,
}

impl ResourceSetValidator {
    #[must_use]
    pub fn new(declared_element_type: Option<String>) -> Self {
        Self {
            declared_element_type,
            first_seen: None,
        }
    }

    /// Validate the concrete type of the next resource in the set.
    pub fn validate_resource_type(&mut self, model: &EdmModel, concrete: &str) -> WriteResult<()> {
        if let Some(declared) = &self.declared_element_type {
            if !model.is_assignable(concrete, declared) {
                return Err(constructors::incompatible_resource_types(concrete, declared));
            }
            return Ok(());
        }
        match &self.first_seen {
            Some(first) if first != concrete => {
                Err(constructors::incompatible_resource_types(concrete, first))
            }
            Some(_) => Ok(()),
            None => {
                self.first_seen = Some(concrete.to_owned());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{EdmModel, EdmStructuredType};
    use crate::error::WriteErrorKind;

    fn model() -> EdmModel {
        EdmModel::new("Container")
            .with_type(EdmStructuredType::entity("NS.Customer"))
            .with_type(EdmStructuredType::entity("NS.VipCustomer").with_base("NS.Customer"))
            .with_type(EdmStructuredType::entity("NS.Order"))
    }

    #[test]
    fn declared_element_type_accepts_derived_types() {
        let model = model();
        let mut validator = ResourceSetValidator::new(Some("NS.Customer".to_owned()));
        assert!(validator.validate_resource_type(&model, "NS.Customer").is_ok());
        assert!(validator.validate_resource_type(&model, "NS.VipCustomer").is_ok());
        let err = validator.validate_resource_type(&model, "NS.Order").unwrap_err();
        assert_eq!(err.kind(), WriteErrorKind::IncompatibleResourceTypes);
    }

    #[test]
    fn undeclared_sets_require_one_identical_type() {
        let model = model();
        let mut validator = ResourceSetValidator::new(None);
        assert!(validator.validate_resource_type(&model, "NS.Customer").is_ok());
        assert!(validator.validate_resource_type(&model, "NS.Customer").is_ok());
        assert!(validator
            .validate_resource_type(&model, "NS.VipCustomer")
            .is_err());
    }
}
