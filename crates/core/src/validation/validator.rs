use serde_json::Value;

use super::schema::{FieldKind, FieldRule, Schema};
use crate::errors::ValidationError;

/// Runs `payload` through `schema`.
///
/// On success the payload is handed back untouched. On failure the error
/// carries one message per failing field, in declaration order (or just the
/// first one when the schema aborts early).
pub fn validate(schema: &Schema, payload: Value) -> Result<Value, ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError::Schema {
            messages: vec!["\"value\" must be of type object".to_string()],
        });
    };

    let mut messages = Vec::new();
    for rule in &schema.fields {
        let field = object.get(rule.name).filter(|v| !v.is_null());
        let outcome = match field {
            None if rule.required => Some(format!("\"{}\" is required", rule.name)),
            None => None,
            Some(value) => check_field(rule, value),
        };
        if let Some(message) = outcome {
            messages.push(message);
            if schema.abort_early {
                break;
            }
        }
    }

    if messages.is_empty() {
        Ok(payload)
    } else {
        Err(ValidationError::Schema { messages })
    }
}

fn check_field(rule: &FieldRule, value: &Value) -> Option<String> {
    let name = rule.name;
    match rule.kind {
        FieldKind::String => {
            let Some(s) = value.as_str() else {
                return Some(format!("\"{name}\" must be a string"));
            };
            check_string(rule, s)
        }
        FieldKind::Number => {
            let Some(n) = value.as_f64() else {
                return Some(format!("\"{name}\" must be a number"));
            };
            check_range(rule, n)
        }
        FieldKind::Integer => {
            let Some(n) = value.as_i64() else {
                return Some(format!("\"{name}\" must be an integer"));
            };
            check_range(rule, n as f64)
        }
        FieldKind::Boolean => (!value.is_boolean()).then(|| format!("\"{name}\" must be a boolean")),
        FieldKind::Object => {
            (!value.is_object()).then(|| format!("\"{name}\" must be of type object"))
        }
        FieldKind::Array => {
            let Some(items) = value.as_array() else {
                return Some(format!("\"{name}\" must be an array"));
            };
            check_items(rule, items.len())
        }
    }
}

fn check_string(rule: &FieldRule, s: &str) -> Option<String> {
    let name = rule.name;
    let len = s.chars().count();
    if let Some(min) = rule.min_len {
        if len < min {
            return Some(format!(
                "\"{name}\" length must be at least {min} characters long"
            ));
        }
    }
    if let Some(max) = rule.max_len {
        if len > max {
            return Some(format!(
                "\"{name}\" length must be less than or equal to {max} characters long"
            ));
        }
    }
    if let Some(pattern) = &rule.pattern {
        if !pattern.is_match(s) {
            return Some(format!(
                "\"{name}\" with value \"{s}\" fails to match the required pattern: /{}/",
                pattern.as_str()
            ));
        }
    }
    if let Some(allowed) = rule.one_of {
        if !allowed.contains(&s) {
            return Some(format!(
                "\"{name}\" must be one of [{}]",
                allowed.join(", ")
            ));
        }
    }
    None
}

fn check_items(rule: &FieldRule, count: usize) -> Option<String> {
    let name = rule.name;
    if let Some(min) = rule.min_len {
        if count < min {
            return Some(format!("\"{name}\" must contain at least {min} items"));
        }
    }
    if let Some(max) = rule.max_len {
        if count > max {
            return Some(format!(
                "\"{name}\" must contain less than or equal to {max} items"
            ));
        }
    }
    None
}

fn check_range(rule: &FieldRule, n: f64) -> Option<String> {
    let name = rule.name;
    if let Some(min) = rule.min {
        if n < min {
            return Some(format!(
                "\"{name}\" must be greater than or equal to {min}"
            ));
        }
    }
    if let Some(max) = rule.max {
        if n > max {
            return Some(format!("\"{name}\" must be less than or equal to {max}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CATEGORIES: &[&str] = &["food", "bills"];

    fn sample_schema() -> Schema {
        Schema::new(vec![
            FieldRule::string("name").required().length(2, 10),
            FieldRule::number("amount").required().min(0.0),
            FieldRule::string("category").one_of(CATEGORIES),
            FieldRule::string("email").pattern(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
            FieldRule::integer("page").min(1.0),
            FieldRule::boolean("notify"),
            FieldRule::object("details"),
        ])
    }

    #[test]
    fn test_valid_payload_passes_through_unmodified() {
        let payload = json!({
            "name": "Groceries",
            "amount": 120.5,
            "category": "food",
            "extra": "kept"
        });
        let out = validate(&sample_schema(), payload.clone()).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_collects_all_failures_in_declaration_order() {
        let payload = json!({
            "amount": -3,
            "category": "cars",
            "page": 0
        });
        let err = validate(&sample_schema(), payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"name\" is required, \"amount\" must be greater than or equal to 0, \
             \"category\" must be one of [food, bills], \"page\" must be greater than or equal to 1"
        );
    }

    #[test]
    fn test_abort_early_reports_first_failure_only() {
        let schema = sample_schema().abort_early();
        let err = validate(&schema, json!({ "amount": "x" })).unwrap_err();
        match err {
            ValidationError::Schema { messages } => {
                assert_eq!(messages, vec!["\"name\" is required".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatches() {
        let payload = json!({
            "name": 42,
            "amount": "ten",
            "page": 1.5,
            "notify": "yes",
            "details": []
        });
        let ValidationError::Schema { messages } =
            validate(&sample_schema(), payload).unwrap_err()
        else {
            panic!("expected schema error");
        };
        assert_eq!(
            messages,
            vec![
                "\"name\" must be a string",
                "\"amount\" must be a number",
                "\"page\" must be an integer",
                "\"notify\" must be a boolean",
                "\"details\" must be of type object",
            ]
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let payload = json!({ "name": "€€", "amount": 1 });
        assert!(validate(&sample_schema(), payload).is_ok());
        let long = json!({ "name": "abcdefghijk", "amount": 1 });
        let err = validate(&sample_schema(), long).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"name\" length must be less than or equal to 10 characters long"
        );
    }

    #[test]
    fn test_pattern_failure_message() {
        let payload = json!({ "name": "Al", "amount": 1, "email": "nope" });
        let err = validate(&sample_schema(), payload).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("\"email\" with value \"nope\" fails to match the required pattern"));
    }

    #[test]
    fn test_array_item_bounds() {
        let schema = Schema::new(vec![FieldRule::array("debts").required().length(1, 2)]);
        assert!(validate(&schema, json!({ "debts": [{}] })).is_ok());
        assert_eq!(
            validate(&schema, json!({ "debts": [] })).unwrap_err().to_string(),
            "\"debts\" must contain at least 1 items"
        );
        assert_eq!(
            validate(&schema, json!({ "debts": {} })).unwrap_err().to_string(),
            "\"debts\" must be an array"
        );
    }

    #[test]
    fn test_null_counts_as_absent() {
        let payload = json!({ "name": null, "amount": 1 });
        let err = validate(&sample_schema(), payload).unwrap_err();
        assert_eq!(err.to_string(), "\"name\" is required");
    }

    #[test]
    fn test_non_object_payload() {
        let err = validate(&sample_schema(), json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "\"value\" must be of type object");
    }
}
