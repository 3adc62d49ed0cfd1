//! Schema-based input validation.
//!
//! A [`Schema`] is an ordered list of declared fields, each with a
//! [`FieldRule`]. Validation is a single non-short-circuiting pass: every
//! violated constraint produces one message, in field declaration order, and
//! the whole list is returned at once. On success the input comes back with
//! every declared field coerced to its declared type; undeclared fields pass
//! through untouched.
//!
//! ```
//! use aapkaun_core::validation::{FieldRule, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("email", FieldRule::string().email().required())
//!     .field("password", FieldRule::string().min(6).required());
//!
//! let input = json!({ "email": "a@b.com", "password": "12" });
//! let errors = schema.validate(input.as_object().unwrap()).unwrap_err();
//! assert_eq!(errors, vec!["\"password\" length must be at least 6 characters long"]);
//! ```

use crate::envelope::Payload;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON string.
    String,
    /// Any finite number; numeric strings are coerced.
    Number,
    /// Whole number; numeric strings are coerced.
    Integer,
    /// `true`/`false`; the strings `"true"`/`"false"` are coerced.
    Boolean,
}

/// Constraints attached to one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    #[serde(rename = "type")]
    field_type: FieldType,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl FieldRule {
    const fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            min: None,
            max: None,
            email: false,
            default: None,
        }
    }

    /// Optional string field.
    #[must_use]
    pub const fn string() -> Self {
        Self::of(FieldType::String)
    }

    /// Optional number field.
    #[must_use]
    pub const fn number() -> Self {
        Self::of(FieldType::Number)
    }

    /// Optional integer field.
    #[must_use]
    pub const fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    /// Optional boolean field.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Minimum length (strings) or lower bound (numbers), inclusive.
    #[must_use]
    pub fn min(mut self, min: u32) -> Self {
        self.min = Some(f64::from(min));
        self
    }

    /// Maximum length (strings) or upper bound (numbers), inclusive.
    #[must_use]
    pub fn max(mut self, max: u32) -> Self {
        self.max = Some(f64::from(max));
        self
    }

    /// Fractional lower bound for number fields.
    #[must_use]
    pub fn min_value(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Fractional upper bound for number fields.
    #[must_use]
    pub fn max_value(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Require a well-formed email address (string fields).
    #[must_use]
    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    /// Value inserted when an optional field is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declared type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn check(&self, name: &str, value: &Value, errors: &mut Vec<String>) -> Option<Value> {
        match self.field_type {
            FieldType::String => self.check_string(name, value, errors),
            FieldType::Number | FieldType::Integer => self.check_number(name, value, errors),
            FieldType::Boolean => check_boolean(name, value, errors),
        }
    }

    fn check_string(&self, name: &str, value: &Value, errors: &mut Vec<String>) -> Option<Value> {
        let Value::String(text) = value else {
            errors.push(format!("\"{name}\" must be a string"));
            return None;
        };
        if text.is_empty() {
            errors.push(format!("\"{name}\" is not allowed to be empty"));
            return None;
        }

        let before = errors.len();
        #[allow(clippy::cast_precision_loss)]
        let length = text.chars().count() as f64;
        if let Some(min) = self.min {
            if length < min {
                errors.push(format!(
                    "\"{name}\" length must be at least {} characters long",
                    display_bound(min)
                ));
            }
        }
        if let Some(max) = self.max {
            if length > max {
                errors.push(format!(
                    "\"{name}\" length must be less than or equal to {} characters long",
                    display_bound(max)
                ));
            }
        }
        if self.email && !is_valid_email(text) {
            errors.push(format!("\"{name}\" must be a valid email"));
        }

        (errors.len() == before).then(|| value.clone())
    }

    fn check_number(&self, name: &str, value: &Value, errors: &mut Vec<String>) -> Option<Value> {
        let Some(number) = coerce_number(value) else {
            errors.push(format!("\"{name}\" must be a number"));
            return None;
        };

        let before = errors.len();
        if self.field_type == FieldType::Integer && number.fract() != 0.0 {
            errors.push(format!("\"{name}\" must be an integer"));
        }
        if let Some(min) = self.min {
            if number < min {
                errors.push(format!(
                    "\"{name}\" must be larger than or equal to {}",
                    display_bound(min)
                ));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                errors.push(format!(
                    "\"{name}\" must be less than or equal to {}",
                    display_bound(max)
                ));
            }
        }

        if errors.len() != before {
            return None;
        }
        match value {
            Value::Number(_) => Some(value.clone()),
            _ => Some(number_value(number)),
        }
    }
}

fn check_boolean(name: &str, value: &Value, errors: &mut Vec<String>) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => {
            errors.push(format!("\"{name}\" must be a boolean"));
            None
        }
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        Value::from(number as i64)
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn display_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}

/// Basic address shape check: one `@`, non-empty local part, dotted domain
/// with non-empty labels, and a conservative character set.
fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local)
        && domain.chars().all(valid_domain)
        && domain.split('.').all(|label| !label.is_empty())
}

/// Ordered set of declared fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    /// Empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare a field. Redeclaring a name replaces the earlier rule in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = rule;
        } else {
            self.fields.push((name, rule));
        }
        self
    }

    /// Declared fields in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// JSON description of the schema, for logs and introspection.
    #[must_use]
    pub fn describe(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Validate `input` against this schema.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint as a human-readable message, in
    /// field declaration order.
    pub fn validate(&self, input: &Payload) -> Result<Payload, Vec<String>> {
        let mut sanitized = input.clone();
        let mut errors = Vec::new();

        for (name, rule) in &self.fields {
            match input.get(name) {
                None => {
                    if rule.required {
                        errors.push(format!("\"{name}\" is required"));
                    } else if let Some(default) = &rule.default {
                        sanitized.insert(name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    if let Some(coerced) = rule.check(name, value, &mut errors) {
                        sanitized.insert(name.clone(), coerced);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(sanitized)
        } else {
            Err(errors)
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, rule) in &self.fields {
            map.serialize_entry(name, rule)?;
        }
        map.end()
    }
}

/// Validate against an optional schema. No schema means the input is
/// accepted unchanged.
///
/// # Errors
///
/// See [`Schema::validate`].
pub fn validate(schema: Option<&Schema>, input: &Payload) -> Result<Payload, Vec<String>> {
    match schema {
        Some(schema) => schema.validate(input),
        None => Ok(input.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn sign_up_schema() -> Schema {
        Schema::new()
            .field("email", FieldRule::string().email().required())
            .field("password", FieldRule::string().min(6).max(16).required())
            .field("firstName", FieldRule::string().min(3).max(20).required())
    }

    #[test]
    fn test_collects_every_violation_in_declaration_order() {
        let errors = sign_up_schema()
            .validate(&payload(json!({ "email": "nope", "password": "12" })))
            .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "\"email\" must be a valid email",
                "\"password\" length must be at least 6 characters long",
                "\"firstName\" is required",
            ]
        );
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let data = sign_up_schema()
            .validate(&payload(json!({
                "email": "a@b.com",
                "password": "secret1",
                "firstName": "Ada",
                "referrer": "ad-campaign"
            })))
            .unwrap();

        assert_eq!(data["referrer"], json!("ad-campaign"));
    }

    #[test]
    fn test_max_length() {
        let schema = Schema::new().field("password", FieldRule::string().max(4));
        let errors = schema.validate(&payload(json!({ "password": "12345" }))).unwrap_err();
        assert_eq!(
            errors,
            vec!["\"password\" length must be less than or equal to 4 characters long"]
        );
    }

    #[test]
    fn test_empty_string_rejected() {
        let schema = Schema::new().field("name", FieldRule::string());
        let errors = schema.validate(&payload(json!({ "name": "" }))).unwrap_err();
        assert_eq!(errors, vec!["\"name\" is not allowed to be empty"]);
    }

    #[test]
    fn test_number_coercion_and_bounds() {
        let schema = Schema::new()
            .field("age", FieldRule::integer().min(18).max(130))
            .field("ratio", FieldRule::number());

        let data = schema
            .validate(&payload(json!({ "age": "42", "ratio": "0.5" })))
            .unwrap();
        assert_eq!(data["age"], json!(42));
        assert_eq!(data["ratio"], json!(0.5));

        let errors = schema
            .validate(&payload(json!({ "age": 12.5, "ratio": "many" })))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "\"age\" must be an integer",
                "\"age\" must be larger than or equal to 18",
                "\"ratio\" must be a number",
            ]
        );
    }

    #[test]
    fn test_fractional_bounds() {
        let schema = Schema::new().field(
            "ratio",
            FieldRule::number().min_value(0.25).max_value(0.75).required(),
        );

        let data = schema.validate(&payload(json!({ "ratio": "0.5" }))).unwrap();
        assert_eq!(data["ratio"], json!(0.5));

        let low = schema.validate(&payload(json!({ "ratio": 0.1 }))).unwrap_err();
        assert_eq!(low, vec!["\"ratio\" must be larger than or equal to 0.25"]);

        let high = schema.validate(&payload(json!({ "ratio": 1 }))).unwrap_err();
        assert_eq!(high, vec!["\"ratio\" must be less than or equal to 0.75"]);
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = Schema::new().field("remember", FieldRule::boolean());
        let data = schema.validate(&payload(json!({ "remember": "TRUE" }))).unwrap();
        assert_eq!(data["remember"], json!(true));

        let errors = schema.validate(&payload(json!({ "remember": 1 }))).unwrap_err();
        assert_eq!(errors, vec!["\"remember\" must be a boolean"]);
    }

    #[test]
    fn test_string_type_mismatch() {
        let schema = Schema::new().field("name", FieldRule::string().min(3));
        let errors = schema.validate(&payload(json!({ "name": 12 }))).unwrap_err();
        assert_eq!(errors, vec!["\"name\" must be a string"]);
    }

    #[test]
    fn test_default_applied_to_absent_optional_field() {
        let schema = Schema::new().field("page", FieldRule::integer().default_value(1));
        let data = schema.validate(&Payload::new()).unwrap();
        assert_eq!(data["page"], json!(1));
    }

    #[test]
    fn test_absent_schema_is_identity() {
        let input = payload(json!({ "anything": [1, 2, 3] }));
        assert_eq!(validate(None, &input).unwrap(), input);
    }

    #[test]
    fn test_describe_lists_every_rule() {
        let description = sign_up_schema().describe();
        assert_eq!(description.as_object().unwrap().len(), 3);
        assert_eq!(description["password"]["min"], json!(6.0));
        assert_eq!(description["email"]["email"], json!(true));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user+tag@sub.example.co.uk"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("a@b"));
    }

    proptest! {
        #[test]
        fn prop_ok_contains_required_fields_or_errors_nonempty(
            email in proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.com"),
            password in proptest::option::of("[a-z0-9]{0,20}"),
        ) {
            let schema = Schema::new()
                .field("email", FieldRule::string().email().required())
                .field("password", FieldRule::string().min(6).max(16).required());

            let mut input = Payload::new();
            if let Some(email) = &email {
                input.insert("email".to_string(), json!(email));
            }
            if let Some(password) = &password {
                input.insert("password".to_string(), json!(password));
            }

            match schema.validate(&input) {
                Ok(data) => {
                    prop_assert!(data.contains_key("email"));
                    prop_assert!(data.contains_key("password"));
                }
                Err(errors) => prop_assert!(!errors.is_empty()),
            }
        }

        #[test]
        fn prop_validation_is_deterministic(name in ".{0,12}", age in any::<i32>()) {
            let schema = Schema::new()
                .field("name", FieldRule::string().min(2).max(8).required())
                .field("age", FieldRule::integer().min(0).max(150));
            let input = payload(json!({ "name": name, "age": age }));

            prop_assert_eq!(schema.validate(&input), schema.validate(&input));
        }
    }
}
