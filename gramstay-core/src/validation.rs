use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::{CoreError, CoreResult};

/// Run `validator` rules and fold field errors into a `CoreError`.
pub fn check<T: Validate>(value: &T) -> CoreResult<()> {
    value
        .validate()
        .map_err(|errors| CoreError::ValidationError(describe(&errors)))
}

/// `field: message` pairs joined with `; `, sorted. Nested fields use dotted paths.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect("", errors, &mut messages);
    messages.sort();

    if messages.is_empty() {
        "invalid input".to_string()
    } else {
        messages.join("; ")
    }
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field: &str = field.as_ref();
        // Struct-level rules report under `__all__`
        let path = if field == "__all__" {
            prefix.to_string()
        } else if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    if path.is_empty() {
                        out.push(msg);
                    } else {
                        out.push(format!("{}: {}", path, msg));
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

/// `validator` custom rule: empty and whitespace-only strings fail
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Reject empty and whitespace-only strings
pub fn require_non_blank(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::ValidationError(format!("{}: must not be blank", field)));
    }
    Ok(())
}
