//! Contact details collected before sending a wishlist inquiry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use cozy_furniture_core::Email;
use regex::Regex;
use serde::Deserialize;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("Invalid regex"));

/// Longest accepted free-text message.
const MAX_MESSAGE_LEN: usize = 2_000;

/// Contact form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub message: String,
}

/// Contact details that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    pub email: Email,
    pub address: String,
    /// Optional note; empty when none was given.
    pub message: String,
}

/// Field-level validation failures, keyed by form field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormError {
    fields: BTreeMap<&'static str, String>,
}

impl ContactFormError {
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<&'static str, String> {
        &self.fields
    }
}

impl fmt::Display for ContactFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Please correct the highlighted fields")
    }
}

impl std::error::Error for ContactFormError {}

impl ContactForm {
    /// Validate every field, collecting all failures at once.
    ///
    /// # Errors
    ///
    /// Returns `ContactFormError` listing each invalid field.
    pub fn validate(&self) -> Result<ContactDetails, ContactFormError> {
        let mut fields = BTreeMap::new();

        let name = self.name.trim();
        if name.is_empty() {
            fields.insert("name", "Name is required".to_string());
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            fields.insert("phone", "Phone number is required".to_string());
        } else if !PHONE_RE.is_match(phone) {
            fields.insert("phone", "Please enter a valid phone number".to_string());
        }

        let email = if self.email.trim().is_empty() {
            fields.insert("email", "Email is required".to_string());
            None
        } else {
            Email::parse(&self.email)
                .map_err(|_| {
                    fields.insert("email", "Please enter a valid email address".to_string());
                })
                .ok()
        };

        let address = self.address.trim();
        if address.is_empty() {
            fields.insert("address", "Address is required".to_string());
        }

        let message = self.message.trim();
        if message.chars().count() > MAX_MESSAGE_LEN {
            fields.insert(
                "message",
                format!("Message must be at most {MAX_MESSAGE_LEN} characters"),
            );
        }

        match email {
            Some(email) if fields.is_empty() => Ok(ContactDetails {
                name: name.to_string(),
                phone: phone.to_string(),
                email,
                address: address.to_string(),
                message: message.to_string(),
            }),
            _ => Err(ContactFormError { fields }),
        }
    }
}
