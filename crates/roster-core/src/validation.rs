//! Validation utilities.

use crate::{FieldError, RosterError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `RosterError` on failure.
    fn validate_request(&self) -> Result<(), RosterError> {
        self.validate().map_err(|e| validation_errors_to_roster_error(&e))
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens validator errors into field-level errors.
///
/// Nested structs are reported as `parent.child`, list items as
/// `parent[index].child`.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|err| FieldError {
                    field: field.to_string(),
                    message: err.message.as_ref().map_or_else(
                        || format!("Validation failed for field '{}'", field),
                        ToString::to_string,
                    ),
                    code: err.code.to_string(),
                }));
            }
            ValidationErrorsKind::Struct(nested) => {
                out.extend(field_errors(nested).into_iter().map(|e| FieldError {
                    field: format!("{}.{}", field, e.field),
                    ..e
                }));
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    out.extend(field_errors(nested).into_iter().map(|e| FieldError {
                        field: format!("{}[{}].{}", field, index, e.field),
                        ..e
                    }));
                }
            }
        }
    }

    out
}

/// Converts `validator::ValidationErrors` to a single `RosterError`.
#[must_use]
pub fn validation_errors_to_roster_error(errors: &ValidationErrors) -> RosterError {
    let mut fields = field_errors(errors);
    fields.sort_by(|a, b| a.field.cmp(&b.field));

    let message = fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    RosterError::validation(message)
}
