//! Payload validation against a fixed field contract.
//!
//! Validation is a pure function: it never touches the database and reports
//! every failed check at once instead of stopping at the first one.

use serde_json::{Map, Value};

/// JSON type a field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.is_i64(),
        }
    }
}

/// Rule for a single field of a payload
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Minimum length in characters, text fields only
    pub min_length: Option<usize>,
    /// Inclusive lower bound, integer fields only
    pub minimum: Option<i64>,
}

impl FieldRule {
    /// A required string field
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
            min_length: None,
            minimum: None,
        }
    }

    /// A required integer field
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            required: true,
            min_length: None,
            minimum: None,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn non_empty(mut self) -> Self {
        self.min_length = Some(1);
        self
    }

    pub const fn at_least(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    fn check(&self, fields: &Map<String, Value>, errors: &mut Vec<String>) {
        let Some(value) = fields.get(self.name) else {
            if self.required {
                errors.push(format!("\"{}\" is required", self.name));
            }
            return;
        };

        if !self.kind.matches(value) {
            errors.push(format!(
                "\"{}\" must be {}",
                self.name,
                self.kind.describe()
            ));
            return;
        }

        if let (Some(min_length), Some(text)) = (self.min_length, value.as_str()) {
            if text.chars().count() < min_length {
                if min_length == 1 {
                    errors.push(format!("\"{}\" must not be empty", self.name));
                } else {
                    errors.push(format!(
                        "\"{}\" must be at least {} characters",
                        self.name, min_length
                    ));
                }
            }
        }

        if let Some(minimum) = self.minimum {
            let below = value.as_i64().is_some_and(|number| number < minimum);
            if below {
                errors.push(format!("\"{}\" must be at least {}", self.name, minimum));
            }
        }
    }
}

/// Named set of field rules a payload must satisfy
#[derive(Debug, Clone, Copy)]
pub struct FieldContract {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

impl FieldContract {
    pub const fn new(name: &'static str, fields: &'static [FieldRule]) -> Self {
        Self { name, fields }
    }
}

/// Check `payload` against `contract`, returning every violation found.
///
/// An empty result means the payload is valid. Fields not named in the
/// contract are ignored.
pub fn validate(payload: &Value, contract: &FieldContract) -> Vec<String> {
    let Some(fields) = payload.as_object() else {
        return vec!["payload must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();
    for rule in contract.fields {
        rule.check(fields, &mut errors);
    }

    if !errors.is_empty() {
        tracing::debug!(
            contract = contract.name,
            error_count = errors.len(),
            "payload failed validation"
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOTE_FIELDS: &[FieldRule] = &[
        FieldRule::text("id").non_empty(),
        FieldRule::text("body"),
        FieldRule::integer("stars").at_least(1),
        FieldRule::text("tag").optional(),
    ];

    const NOTE: FieldContract = FieldContract::new("note", NOTE_FIELDS);

    #[test]
    fn valid_payload_has_no_errors() {
        let payload = json!({"id": "n1", "body": "hello", "stars": 3});
        assert!(validate(&payload, &NOTE).is_empty());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let payload = json!({"id": "n1", "body": "", "stars": 1, "colour": "blue"});
        assert!(validate(&payload, &NOTE).is_empty());
    }

    #[test]
    fn every_missing_field_is_reported() {
        let errors = validate(&json!({}), &NOTE);
        assert_eq!(
            errors,
            vec![
                "\"id\" is required",
                "\"body\" is required",
                "\"stars\" is required",
            ]
        );
    }

    #[test]
    fn wrong_types_are_reported_together() {
        let payload = json!({"id": 7, "body": null, "stars": "3", "tag": false});
        let errors = validate(&payload, &NOTE);
        assert_eq!(
            errors,
            vec![
                "\"id\" must be a string",
                "\"body\" must be a string",
                "\"stars\" must be an integer",
                "\"tag\" must be a string",
            ]
        );
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        let payload = json!({"id": "n1", "body": "b", "stars": 2.5});
        assert_eq!(
            validate(&payload, &NOTE),
            vec!["\"stars\" must be an integer"]
        );
    }

    #[test]
    fn bounds_are_enforced() {
        let payload = json!({"id": "", "body": "b", "stars": 0});
        assert_eq!(
            validate(&payload, &NOTE),
            vec!["\"id\" must not be empty", "\"stars\" must be at least 1"]
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            validate(&json!(["id", "body"]), &NOTE),
            vec!["payload must be a JSON object"]
        );
        assert_eq!(
            validate(&Value::Null, &NOTE),
            vec!["payload must be a JSON object"]
        );
    }
}
