//! Per-invocation context.

use crate::envelope::Payload;
use crate::identity::CallerIdentity;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Header map with lower-cased names.
pub type Headers = BTreeMap<String, String>;

/// Shallow merge of path parameters, query parameters and body fields.
///
/// Later sources win on key collisions; nested objects are replaced, not
/// merged.
///
/// ```
/// use aapkaun_core::context::merge_input;
/// use serde_json::json;
///
/// let path = json!({ "id": "1" }).as_object().cloned().unwrap();
/// let query = json!({ "id": "2", "page": "3" }).as_object().cloned().unwrap();
/// let body = json!({ "page": 4 }).as_object().cloned().unwrap();
///
/// let merged = merge_input(path, query, body);
/// assert_eq!(merged["id"], json!("2"));
/// assert_eq!(merged["page"], json!(4));
/// ```
#[must_use]
pub fn merge_input(path: Payload, query: Payload, body: Payload) -> Payload {
    let mut merged = path;
    merged.extend(query);
    merged.extend(body);
    merged
}

/// State flowing through one invocation.
///
/// Everything is fixed at construction except the validated-data slot and
/// the collected validation errors, which only the engine writes.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    raw_input: Payload,
    headers: Headers,
    caller: Option<CallerIdentity>,
    is_authenticated: bool,
    correlation_id: Uuid,
    validated: Option<Payload>,
    errors: Vec<String>,
}

impl InvocationContext {
    /// Build a context. Header names are lower-cased.
    #[must_use]
    pub fn new(
        raw_input: Payload,
        headers: impl IntoIterator<Item = (String, String)>,
        caller: Option<CallerIdentity>,
        is_authenticated: bool,
    ) -> Self {
        Self {
            raw_input,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            caller,
            is_authenticated,
            correlation_id: Uuid::new_v4(),
            validated: None,
            errors: Vec::new(),
        }
    }

    /// Replace the generated correlation id with one supplied by the transport.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Working data: the sanitized input once validation passed, the raw
    /// input before that.
    #[must_use]
    pub fn data(&self) -> &Payload {
        self.validated.as_ref().unwrap_or(&self.raw_input)
    }

    /// String field from the working data.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.data().get(key).and_then(Value::as_str)
    }

    /// Merged input as received.
    #[must_use]
    pub const fn raw_input(&self) -> &Payload {
        &self.raw_input
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Identity supplied by the transport.
    #[must_use]
    pub const fn caller(&self) -> Option<&CallerIdentity> {
        self.caller.as_ref()
    }

    /// Authentication flag supplied by the transport.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Correlation id for logs.
    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Whether validation has replaced the raw input.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        self.validated.is_some()
    }

    /// Validation messages, empty until validation fails.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub(crate) fn accept(&mut self, data: Payload) {
        self.validated = Some(data);
    }

    pub(crate) fn reject(&mut self, errors: Vec<String>) {
        self.errors.extend(errors);
    }
}
