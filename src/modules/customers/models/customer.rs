// Customer model and request DTO
//
// A customer owns many quotations. Email addresses are unique across
// customers; uniqueness is checked by the service and enforced by the
// `customers_email_unique` index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A stored customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// `City, State Postal` line, when a city is known
    pub fn locality(&self) -> Option<String> {
        let city = self.city.as_deref().filter(|c| !c.trim().is_empty())?;
        let tail = [self.state.as_deref(), self.postal_code.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if tail.is_empty() {
            Some(city.to_string())
        } else {
            Some(format!("{}, {}", city, tail))
        }
    }
}

/// Body of `POST /api/customers` and `PUT /api/customers/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CustomerRequest {
    #[serde(default)]
    #[validate(custom = "validate_required_text")]
    pub name: String,

    #[serde(default)]
    #[validate(custom = "validate_required_text")]
    pub contact_person: String,

    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(custom = "validate_required_text")]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "The address field is required."))]
    pub address: String,

    #[validate(length(max = 255, message = "The address2 may not be greater than 255 characters."))]
    pub address2: Option<String>,

    #[validate(length(max = 255, message = "The city may not be greater than 255 characters."))]
    pub city: Option<String>,

    #[validate(length(max = 255, message = "The state may not be greater than 255 characters."))]
    pub state: Option<String>,

    #[validate(length(max = 20, message = "The postal code may not be greater than 20 characters."))]
    pub postal_code: Option<String>,
}

impl CustomerRequest {
    /// Trim text fields and turn blank optional fields into `None`
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.name = self.name.trim().to_string();
        self.contact_person = self.contact_person.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.phone = self.phone.trim().to_string();
        self.address = self.address.trim().to_string();
        self.address2 = blank_to_none(self.address2);
        self.city = blank_to_none(self.city);
        self.state = blank_to_none(self.state);
        self.postal_code = blank_to_none(self.postal_code);
        self
    }
}

fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        return Err(err);
    }

    if value.chars().count() > 255 {
        let mut err = ValidationError::new("max");
        err.message = Some("This field may not be greater than 255 characters.".into());
        return Err(err);
    }

    Ok(())
}
