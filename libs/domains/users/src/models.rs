use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::Validate;

/// Loose email shape check: something@something.tld, no whitespace.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

fn validate_email_format(email: &str) -> Result<(), validator::ValidationError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(validator::ValidationError::new("email_format"));
    }
    Ok(())
}

/// Geographic coordinates, kept as the strings the client sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "-37.3159")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "81.1496")]
    pub lng: Option<String>,
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Gwenborough")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "92998-3874")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

/// User document as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Current time truncated to the millisecond precision of a BSON date.
pub(crate) fn now() -> DateTime<Utc> {
    mongodb::bson::DateTime::now().to_chrono()
}

impl User {
    /// Build a fresh document with a new identifier and both timestamps set to now.
    pub fn new(input: NewUser) -> Self {
        let timestamp = now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            address: input.address,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Apply a partial update in place. Omitted fields are left untouched.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        self.updated_at = now();
    }
}

/// JSON representation of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// 24-character hex identifier
    #[serde(rename = "_id")]
    #[schema(example = "65f1c2a9e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@x.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            company: user.company,
            address: user.address,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for creating a user
///
/// `name` and `email` are optional at the type level so that a missing field is reported
/// as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(required(code = "required"), length(min = 1, code = "required"))]
    #[schema(example = "Ann")]
    pub name: Option<String>,
    #[validate(
        required(code = "required"),
        length(min = 1, code = "required"),
        custom(function = "validate_email_format")
    )]
    #[schema(example = "ann@x.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<Address>,
}

/// Request body for updating a user. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_email_format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Replaces the stored address as a whole
    pub address: Option<Address>,
}

/// Validated create payload handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<Address>,
}

impl TryFrom<CreateUser> for NewUser {
    type Error = validator::ValidationErrors;

    fn try_from(input: CreateUser) -> Result<Self, Self::Error> {
        input.validate()?;

        // validate() guarantees both are present
        let (Some(name), Some(email)) = (input.name, input.email) else {
            let mut errors = validator::ValidationErrors::new();
            errors.add("name", validator::ValidationError::new("required"));
            return Err(errors);
        };

        Ok(Self {
            name,
            email,
            phone: input.phone,
            company: input.company,
            address: input.address,
        })
    }
}
