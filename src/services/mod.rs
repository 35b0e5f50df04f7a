// Service exports
pub mod error;
pub mod fixtures;
pub mod postgres;

pub use error::StoreError;
pub use fixtures::{FixtureSet, FixtureStore};
pub use postgres::PostgresClient;

use crate::models::{
    GuestReservation, Listing, ListingFilter, ListingWithRating, NewListing, NewUser,
    ReservationRequest, User,
};

/// Data operations of the rental app
///
/// Implemented by `PostgresClient` and `FixtureStore`; callers take the store
/// as a parameter rather than reaching for a global pool.
#[allow(async_fn_in_trait)]
pub trait RentalStore {
    /// Look up a user by email, case-insensitively
    async fn get_user_with_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_with_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Register a user; the email is stored lower-case and must be unique
    async fn add_user(&self, user: &NewUser) -> Result<User, StoreError>;

    /// A guest's reservations, most recent start date first, at most `request.limit`
    async fn get_all_reservations(
        &self,
        request: &ReservationRequest,
    ) -> Result<Vec<GuestReservation>, StoreError>;

    /// Listings matching `filter`, cheapest first, at most `filter.limit`
    async fn get_all_listings(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithRating>, StoreError>;

    /// Create a listing; the owner must be a registered user
    async fn add_listing(&self, listing: &NewListing) -> Result<Listing, StoreError>;
}
