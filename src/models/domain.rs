use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Registered user (guest and/or owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Rentable property record
///
/// `cost_per_night` is stored in cents to keep currency math integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail_photo_url: String,
    #[serde(default)]
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    #[serde(default)]
    pub parking_spaces: i32,
    #[serde(default)]
    pub number_of_bathrooms: i32,
    #[serde(default)]
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Listing {
    /// Nightly cost in currency units
    pub fn nightly_cost(&self) -> f64 {
        f64::from(self.cost_per_night) / 100.0
    }
}

fn default_true() -> bool { true }

/// Guest review of a stay. Only ever aggregated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i32,
    pub guest_id: i32,
    pub property_id: i32,
    pub reservation_id: i32,
    pub rating: i32,
    #[serde(default)]
    pub message: String,
}

/// Booking of a listing by a guest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub property_id: i32,
    pub guest_id: i32,
}

/// Listing row plus its review average, computed at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingWithRating {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub listing: Listing,
    pub average_rating: f64,
}

/// A guest's reservation joined with the reserved listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GuestReservation {
    pub reservation_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub listing: Listing,
    pub average_rating: f64,
}

/// Convert a currency amount to integer cents, rounding to the nearest cent.
/// `None` when the result does not fit an `i32` (or the amount is NaN).
pub fn to_cents(amount: f64) -> Option<i32> {
    let cents = (amount * 100.0).round();
    if cents.is_finite() && cents >= f64::from(i32::MIN) && cents <= f64::from(i32::MAX) {
        Some(cents as i32)
    } else {
        None
    }
}
