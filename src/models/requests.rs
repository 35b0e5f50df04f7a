use serde::{Deserialize, Serialize};
use validator::Validate;

/// Listing search criteria
///
/// Every criterion is optional; an absent field means "no constraint".
/// Prices are in currency units, not cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListingFilter {
    /// Case-sensitive substring of the city name
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i32>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub minimum_price_per_night: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub maximum_price_per_night: Option<f64>,
    #[validate(range(min = 1.0, max = 5.0))]
    #[serde(default)]
    pub minimum_rating: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub fn default_limit() -> i64 {
    10
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            city: None,
            owner_id: None,
            minimum_price_per_night: None,
            maximum_price_per_night: None,
            minimum_rating: None,
            limit: default_limit(),
        }
    }
}

impl ListingFilter {
    /// Empty filter with the default cap
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Accept a city wrapped in one delimiter character on each side
    /// (e.g. `%Vancouver%`) and keep only the inner text.
    pub fn with_delimited_city(self, raw: &str) -> Self {
        self.with_city(strip_delimiters(raw))
    }

    pub fn with_owner(mut self, owner_id: i32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_price_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum_price_per_night = minimum;
        self.maximum_price_per_night = maximum;
        self
    }

    pub fn with_minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// A guest's reservation history request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReservationRequest {
    pub guest_id: i32,
    #[validate(range(min = 1))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl ReservationRequest {
    /// Request for `guest_id` with the default cap
    pub fn new(guest_id: i32) -> Self {
        Self {
            guest_id,
            limit: default_limit(),
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// Drop the first and last character. Strings too short to carry both
/// delimiters come back empty.
pub fn strip_delimiters(raw: &str) -> &str {
    let mut chars = raw.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return "";
    }
    chars.as_str()
}

/// New user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// New listing submitted by an owner
///
/// `cost_per_night` is in currency units; it is stored as cents.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewListing {
    pub owner_id: i32,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail_photo_url: String,
    #[serde(default)]
    pub cover_photo_url: String,
    // Largest amount whose cents still fit the INTEGER column
    #[validate(range(min = 0.0, max = 21474836.47))]
    pub cost_per_night: f64,
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub province: String,
    #[validate(length(min = 1))]
    pub post_code: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub parking_spaces: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub number_of_bathrooms: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub number_of_bedrooms: i32,
}
