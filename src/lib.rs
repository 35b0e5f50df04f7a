//! LightBnB - data-access layer for the LightBnB property rental app
//!
//! Reads and writes users, listings and reservations in PostgreSQL, with an
//! in-memory fixture store that answers the same operations. The listing
//! search composes a single parameterized statement from typed predicates.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ListingPredicate, ListingQuery};
pub use models::{
    GuestReservation, Listing, ListingFilter, ListingWithRating, NewListing, NewUser,
    ReservationRequest, User,
};
pub use services::{FixtureStore, PostgresClient, RentalStore, StoreError};
