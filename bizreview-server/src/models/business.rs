//! Business records and their validated request payloads

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::FromRow;

use super::validation::{bounded_text, required};
use super::ValidationError;

const MAX_NAME_LEN: usize = 50;
const MAX_STREET_ADDRESS_LEN: usize = 100;
const MAX_CITY_LEN: usize = 50;

/// Two-letter state code, matches VARCHAR(2)
static STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("invalid state regex"));

/// Five-digit zip code, matches VARCHAR(5)
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("invalid zip regex"));

/// Business record from storage
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Business {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
}

/// Validated attributes for a new business (or a full replacement)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBusiness {
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Validated partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessChanges {
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl BusinessChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply to an existing record in place.
    pub fn apply(self, business: &mut Business) {
        if let Some(owner_id) = self.owner_id {
            business.owner_id = owner_id;
        }
        if let Some(name) = self.name {
            business.name = name;
        }
        if let Some(street_address) = self.street_address {
            business.street_address = street_address;
        }
        if let Some(city) = self.city {
            business.city = city;
        }
        if let Some(state) = self.state {
            business.state = state;
        }
        if let Some(zip_code) = self.zip_code {
            business.zip_code = zip_code;
        }
    }
}

impl From<NewBusiness> for BusinessChanges {
    fn from(b: NewBusiness) -> Self {
        Self {
            owner_id: Some(b.owner_id),
            name: Some(b.name),
            street_address: Some(b.street_address),
            city: Some(b.city),
            state: Some(b.state),
            zip_code: Some(b.zip_code),
        }
    }
}

/// Business request body for POST, PUT and PATCH.
///
/// Every field is optional at the wire level so that a missing field is
/// reported by name instead of as a generic decode failure. Unknown fields
/// are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessPayload {
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl BusinessPayload {
    /// Validate as a complete record (create and full replace).
    pub fn into_new(self) -> Result<NewBusiness, ValidationError> {
        Ok(NewBusiness {
            owner_id: required(self.owner_id, "owner_id")?,
            name: validate_name(&required(self.name, "name")?)?,
            street_address: validate_street_address(&required(
                self.street_address,
                "street_address",
            )?)?,
            city: validate_city(&required(self.city, "city")?)?,
            state: validate_state(&required(self.state, "state")?)?,
            zip_code: validate_zip_code(&required(self.zip_code, "zip_code")?)?,
        })
    }

    /// Validate as a partial update. At least one field must be present.
    pub fn into_changes(self) -> Result<BusinessChanges, ValidationError> {
        let changes = BusinessChanges {
            owner_id: self.owner_id,
            name: self.name.as_deref().map(validate_name).transpose()?,
            street_address: self
                .street_address
                .as_deref()
                .map(validate_street_address)
                .transpose()?,
            city: self.city.as_deref().map(validate_city).transpose()?,
            state: self.state.as_deref().map(validate_state).transpose()?,
            zip_code: self.zip_code.as_deref().map(validate_zip_code).transpose()?,
        };

        if changes.is_empty() {
            return Err(ValidationError::NoChanges);
        }
        Ok(changes)
    }
}

fn validate_name(s: &str) -> Result<String, ValidationError> {
    bounded_text(s, "name", MAX_NAME_LEN)
}

fn validate_street_address(s: &str) -> Result<String, ValidationError> {
    bounded_text(s, "street_address", MAX_STREET_ADDRESS_LEN)
}

fn validate_city(s: &str) -> Result<String, ValidationError> {
    bounded_text(s, "city", MAX_CITY_LEN)
}

/// State codes are stored upper-case.
fn validate_state(s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if !STATE_RE.is_match(s) {
        return Err(ValidationError::InvalidFormat {
            field: "state",
            reason: "must be a two-letter state code",
        });
    }
    Ok(s.to_ascii_uppercase())
}

fn validate_zip_code(s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if !ZIP_RE.is_match(s) {
        return Err(ValidationError::InvalidFormat {
            field: "zip_code",
            reason: "must be exactly five digits",
        });
    }
    Ok(s.to_owned())
}
