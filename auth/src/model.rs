//! User data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated form; `None` for anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Personal name parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Middle name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl PersonName {
    /// Name from first and last parts.
    #[must_use]
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: Some(first.into()),
            middle: None,
            last: Some(last.into()),
        }
    }

    /// Present parts joined by single spaces.
    #[must_use]
    pub fn full(&self) -> String {
        [&self.first, &self.middle, &self.last]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Email address attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    /// Address as entered.
    pub email: String,
    /// Used for sign-in and contact.
    pub is_primary: bool,
    /// Ownership confirmed.
    pub is_verified: bool,
}

impl EmailAddress {
    /// Unverified primary address.
    #[must_use]
    pub fn primary(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_primary: true,
            is_verified: false,
        }
    }
}

/// Phone number attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    /// Local number.
    pub number: String,
    /// Country calling code.
    pub country_code: String,
    /// Used for contact.
    pub is_primary: bool,
    /// Ownership confirmed.
    pub is_verified: bool,
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Name parts.
    #[serde(default)]
    pub name: PersonName,

    /// Email addresses; sign-in uses any of them.
    #[serde(default)]
    pub emails: Vec<EmailAddress>,

    /// Password hash, never serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Phone numbers.
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,

    /// Set on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Set on every save or update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Blank record with a fresh id, not yet persisted.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: UserId::new(),
            name: PersonName::default(),
            emails: Vec::new(),
            password: None,
            phone_numbers: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Primary email, falling back to the first one.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|address| address.is_primary)
            .or_else(|| self.emails.first())
            .map(|address| address.email.as_str())
    }

    /// Whether any attached address equals `email`.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|address| address.email == email)
    }

    /// Public projection: id, display name and primary email.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "name": self.name.full(),
            "email": self.primary_email(),
        })
    }
}

/// Lookup keys understood by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    /// Match on `_id`.
    Id,
    /// Match on any `emails.email`.
    Email,
}

impl UserField {
    /// Document path of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Email => "emails.email",
        }
    }

    /// Whether `user` matches `value` on this field.
    #[must_use]
    pub fn matches(self, user: &User, value: &str) -> bool {
        match self {
            Self::Id => user.id.to_string() == value,
            Self::Email => user.has_email(value),
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// Replace the name.
    pub name: Option<PersonName>,
    /// Replace the email list.
    pub emails: Option<Vec<EmailAddress>>,
    /// Replace the password hash.
    pub password: Option<String>,
    /// Replace the phone numbers.
    pub phone_numbers: Option<Vec<PhoneNumber>>,
}

impl UserUpdate {
    /// `true` when nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.emails.is_none()
            && self.password.is_none()
            && self.phone_numbers.is_none()
    }

    /// Apply the set fields to `user`, stamping `updated_at`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(emails) = self.emails {
            user.emails = emails;
        }
        if let Some(password) = self.password {
            user.password = Some(password);
        }
        if let Some(phone_numbers) = self.phone_numbers {
            user.phone_numbers = phone_numbers;
        }
        user.updated_at = Some(now);
    }
}

/// Counts reported by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Records matching the id.
    pub matched: u64,
    /// Records changed.
    pub modified: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ada() -> User {
        let mut user = User::empty();
        user.name = PersonName::new("Ada", "Lovelace");
        user.emails.push(EmailAddress {
            email: "old@example.com".to_string(),
            is_primary: false,
            is_verified: true,
        });
        user.emails.push(EmailAddress::primary("ada@example.com"));
        user.password = Some("hash".to_string());
        user
    }

    #[test]
    fn test_full_name_skips_missing_parts() {
        assert_eq!(PersonName::new("Ada", "Lovelace").full(), "Ada Lovelace");
        assert_eq!(PersonName::default().full(), "");
    }

    #[test]
    fn test_primary_email_prefers_flag() {
        assert_eq!(ada().primary_email(), Some("ada@example.com"));
        assert_eq!(User::empty().primary_email(), None);
    }

    #[test]
    fn test_field_matching() {
        let user = ada();
        assert!(UserField::Email.matches(&user, "old@example.com"));
        assert!(!UserField::Email.matches(&user, "nobody@example.com"));
        assert!(UserField::Id.matches(&user, &user.id.to_string()));
        assert_eq!(UserField::Email.as_str(), "emails.email");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let value = serde_json::to_value(ada()).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("_id").is_some());
        assert_eq!(value["emails"][1]["isPrimary"], Value::Bool(true));
    }

    #[test]
    fn test_update_touches_only_set_fields() {
        let mut user = ada();
        let now = Utc::now();
        let update = UserUpdate {
            name: Some(PersonName::new("Augusta", "King")),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());

        update.apply(&mut user, now);
        assert_eq!(user.name.full(), "Augusta King");
        assert_eq!(user.password.as_deref(), Some("hash"));
        assert_eq!(user.updated_at, Some(now));
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::new();
        assert_eq!(UserId::parse(&id.to_string()), Some(id));
        assert_eq!(UserId::parse("not-a-uuid"), None);
    }
}
