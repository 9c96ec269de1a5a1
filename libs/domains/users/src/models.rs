use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Phone numbers are digits only, 10 to 15 of them
static DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10,15}$").unwrap());

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !DIGITS_ONLY.is_match(phone) {
        return Err(validator::ValidationError::new("invalid_phone"));
    }
    Ok(())
}

/// User entity - matches SQL schema
///
/// Email uniqueness is case-insensitive; the stored value keeps the
/// caller's casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier, assigned on first save
    pub id: Uuid,
    /// User display name
    pub name: String,
    /// User email (unique)
    pub email: String,
    /// Contact phone number, digits only
    pub phone: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating or replacing a user
///
/// Field-level constraints are enforced by `ValidatedJson` before the
/// service layer sees the input.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

impl User {
    /// Construct a freshly-persisted user from validated input, assigning
    /// the identifier and timestamps
    pub fn new(input: UserInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable fields from an update payload
    pub fn apply_update(&mut self, input: UserInput) {
        self.name = input.name;
        self.email = input.email;
        self.phone = input.phone;
        self.updated_at = Utc::now();
    }
}
