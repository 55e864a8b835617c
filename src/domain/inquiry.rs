/// A form field that must be present and non-empty.
///
/// Whitespace-only values are accepted as-is; only absence and the empty
/// string are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField(String);

impl RequiredField {
    pub fn parse(value: Option<String>) -> Option<RequiredField> {
        value.filter(|v| !v.is_empty()).map(Self)
    }
}

impl AsRef<str> for RequiredField {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

/// A single contact-form submission that passed intake validation.
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub first_name: RequiredField,
    pub last_name: RequiredField,
    pub email: RequiredField,
    pub phone: RequiredField,
    pub message: RequiredField,
}

impl Inquiry {
    /// Validates all five fields at once so the error names every missing one.
    pub fn parse(
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        message: Option<String>,
    ) -> Result<Inquiry, MissingFields> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<String>| {
            let field = RequiredField::parse(value);
            if field.is_none() {
                missing.push(name);
            }
            field
        };

        let first_name = require("firstName", first_name);
        let last_name = require("lastName", last_name);
        let email = require("email", email);
        let phone = require("phone", phone);
        let message = require("message", message);

        match (first_name, last_name, email, phone, message) {
            (Some(first_name), Some(last_name), Some(email), Some(phone), Some(message)) => {
                Ok(Inquiry {
                    first_name,
                    last_name,
                    email,
                    phone,
                    message,
                })
            }
            _ => Err(MissingFields(missing)),
        }
    }
}
