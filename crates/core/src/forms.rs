//! Submitted form structs and their validation.
//!
//! Each form is deserialized with every field as raw text (missing fields
//! become empty strings) so a bad submission can always be re-rendered with
//! what the visitor typed. `validate` turns the raw form into a typed input
//! or a [`FieldErrors`] set keyed by field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::interest::InterestChoice;
use crate::types::{ClientId, Email, ProductId, Username};

const REQUIRED: &str = "This field is required.";

/// Per-field validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a field has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// All errors for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// First error for a field, for inline display.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over `(field, messages)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.errors.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the error set itself when it holds any errors.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trimmed non-empty text, or a "required" error.
fn required<'a>(errors: &mut FieldErrors, field: &'static str, value: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Text no longer than `max` characters.
fn bounded(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// Positive whole number (`>= 1`).
fn positive_int(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<u32> {
    let value = required(errors, field, value);
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).ok().or_else(|| {
            errors.add(field, "Enter a smaller number.");
            None
        }),
        Ok(_) => {
            errors.add(field, "Ensure this value is greater than or equal to 1.");
            None
        }
        Err(_) => {
            errors.add(field, "Enter a whole number.");
            None
        }
    }
}

/// Entity reference chosen from a list.
fn choice<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
) -> Option<T> {
    let value = required(errors, field, value);
    if value.is_empty() {
        return None;
    }
    value.parse().ok().or_else(|| {
        errors.add(field, "Select a valid choice.");
        None
    })
}

// =============================================================================
// Order placement
// =============================================================================

/// Raw order placement form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub client: String,
    pub product: String,
    pub num_units: String,
}

/// Validated order placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderInput {
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderForm {
    /// Validate field formats. Existence of the client and product is checked
    /// against the database by the caller.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any field is invalid.
    pub fn validate(&self) -> Result<OrderInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let client_id = choice::<ClientId>(&mut errors, "client", &self.client);
        let product_id = choice::<ProductId>(&mut errors, "product", &self.product);
        let quantity = positive_int(&mut errors, "num_units", &self.num_units);

        match (client_id, product_id, quantity) {
            (Some(client_id), Some(product_id), Some(quantity)) if errors.is_empty() => {
                Ok(OrderInput {
                    client_id,
                    product_id,
                    quantity,
                })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Product interest
// =============================================================================

/// Raw interest form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterestForm {
    pub interested: String,
    pub quantity: String,
    pub comments: String,
}

/// Validated interest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestInput {
    pub choice: InterestChoice,
    pub quantity: u32,
    pub comments: Option<String>,
}

impl InterestForm {
    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any field is invalid.
    pub fn validate(&self) -> Result<InterestInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let raw_choice = required(&mut errors, "interested", &self.interested);
        let choice = if raw_choice.is_empty() {
            None
        } else {
            InterestChoice::from_form_value(raw_choice).or_else(|| {
                errors.add("interested", "Select a valid choice.");
                None
            })
        };
        let quantity = positive_int(&mut errors, "quantity", &self.quantity);
        let comments = Some(self.comments.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned);

        match (choice, quantity) {
            (Some(choice), Some(quantity)) if errors.is_empty() => Ok(InterestInput {
                choice,
                quantity,
                comments,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Raw registration form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Validated registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: Username,
    pub email: Email,
    pub password: String,
}

/// Longest accepted first/last name.
pub const NAME_MAX_LENGTH: usize = 100;

/// Password length bounds.
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 50;

impl RegisterForm {
    /// Validate the registration. Username uniqueness is checked by the
    /// caller against the database.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any field is invalid.
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = required(&mut errors, "first_name", &self.first_name);
        bounded(&mut errors, "first_name", first_name, NAME_MAX_LENGTH);
        let last_name = required(&mut errors, "last_name", &self.last_name);
        bounded(&mut errors, "last_name", last_name, NAME_MAX_LENGTH);

        let username = match Username::parse(&self.username) {
            Ok(u) => Some(u),
            Err(e) => {
                errors.add("username", capitalize(&e.to_string()));
                None
            }
        };

        let email = match Email::parse(&self.email) {
            Ok(e) => Some(e),
            Err(_) if self.email.trim().is_empty() => {
                errors.add("email", REQUIRED);
                None
            }
            Err(_) => {
                errors.add("email", "Enter a valid email address.");
                None
            }
        };

        // Passwords are not trimmed.
        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else {
            bounded(&mut errors, "password1", &self.password1, PASSWORD_MAX_LENGTH);
            if self.password1.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add(
                    "password1",
                    format!(
                        "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
                    ),
                );
            }
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(Registration {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                username,
                email,
                password: self.password1.clone(),
            }),
            _ => Err(errors),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut out: String = c.to_uppercase().collect();
        out.push_str(chars.as_str());
        out.push('.');
        out
    })
}

// =============================================================================
// Profile
// =============================================================================

/// Raw profile update form (text fields; the avatar arrives separately).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
}

/// Validated profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub bio: String,
}

/// Longest accepted bio.
pub const BIO_MAX_LENGTH: usize = 2000;

impl ProfileForm {
    /// Validate the update.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any field is invalid.
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = required(&mut errors, "first_name", &self.first_name);
        bounded(&mut errors, "first_name", first_name, NAME_MAX_LENGTH);
        let last_name = required(&mut errors, "last_name", &self.last_name);
        bounded(&mut errors, "last_name", last_name, NAME_MAX_LENGTH);
        let bio = self.bio.trim();
        bounded(&mut errors, "bio", bio, BIO_MAX_LENGTH);

        let email = Email::parse(&self.email)
            .map_err(|_| errors.add("email", "Enter a valid email address."))
            .ok();

        match email {
            Some(email) if errors.is_empty() => Ok(ProfileUpdate {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email,
                bio: bio.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}
