use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use validator::Validate;

use super::{RentalStore, StoreError};
use crate::core::{average_rating, ListingQuery};
use crate::models::{
    to_cents, GuestReservation, Listing, ListingFilter, ListingWithRating, NewListing, NewUser,
    Reservation, ReservationRequest, Review, User,
};

/// Static data set, as stored in a fixture JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

/// In-memory store answering the same operations as `PostgresClient`
///
/// Useful when no database is available (local development, tests). The
/// listing search runs the exact same `ListingQuery` as the SQL path.
pub struct FixtureStore {
    data: RwLock<FixtureSet>,
}

impl FixtureStore {
    pub fn new(fixtures: FixtureSet) -> Self {
        tracing::debug!(
            "Fixture store: {} users, {} listings, {} reviews, {} reservations",
            fixtures.users.len(),
            fixtures.listings.len(),
            fixtures.reviews.len(),
            fixtures.reservations.len()
        );

        Self {
            data: RwLock::new(fixtures),
        }
    }

    /// Parse a fixture JSON document
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let fixtures: FixtureSet = serde_json::from_str(json)?;
        Ok(Self::new(fixtures))
    }

    /// Read and parse a fixture JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;

        tracing::info!("Loading fixtures from {}", path.display());

        Self::from_json(&json)
    }

    /// Copy of the current data set
    pub async fn snapshot(&self) -> FixtureSet {
        self.data.read().await.clone()
    }
}

/// Next serial id after `ids`, like a SERIAL column would hand out
fn next_id<I>(ids: I, table: &'static str) -> Result<i32, StoreError>
where
    I: IntoIterator<Item = i32>,
{
    ids.into_iter()
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| {
            tracing::error!("Identifier space exhausted in {}", table);
            StoreError::IdOverflow(table)
        })
}

impl RentalStore for FixtureStore {
    async fn get_user_with_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        let data = self.data.read().await;

        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_with_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let data = self.data.read().await;

        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn add_user(&self, user: &NewUser) -> Result<User, StoreError> {
        user.validate().map_err(|e| StoreError::rejected(e, "add_user"))?;

        let email = user.email.to_lowercase();
        let mut data = self.data.write().await;

        if data.users.iter().any(|u| u.email == email) {
            tracing::warn!("Rejected duplicate registration for {}", email);
            return Err(StoreError::DuplicateEmail(email));
        }

        let created = User {
            id: next_id(data.users.iter().map(|u| u.id), "users")?,
            name: user.name.clone(),
            email,
            password: user.password.clone(),
        };
        data.users.push(created.clone());

        tracing::debug!("Created user {} ({})", created.id, created.email);

        Ok(created)
    }

    async fn get_all_reservations(
        &self,
        request: &ReservationRequest,
    ) -> Result<Vec<GuestReservation>, StoreError> {
        request.validate().map_err(|e| StoreError::rejected(e, "get_all_reservations"))?;
        let guest_id = request.guest_id;
        let data = self.data.read().await;

        let mut reservations: Vec<GuestReservation> = data
            .reservations
            .iter()
            .filter(|r| r.guest_id == guest_id)
            .filter_map(|r| {
                let listing = data.listings.iter().find(|l| l.id == r.property_id)?;
                let average = average_rating(
                    data.reviews
                        .iter()
                        .filter(|review| review.property_id == listing.id)
                        .map(|review| review.rating),
                )?;

                Some(GuestReservation {
                    reservation_id: r.id,
                    start_date: r.start_date,
                    end_date: r.end_date,
                    listing: listing.clone(),
                    average_rating: average,
                })
            })
            .collect();

        reservations.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        reservations.truncate(usize::try_from(request.limit).unwrap_or(0));

        tracing::debug!("Guest {} has {} reservations", guest_id, reservations.len());

        Ok(reservations)
    }

    async fn get_all_listings(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithRating>, StoreError> {
        let search = ListingQuery::from_filter(filter)
            .map_err(|e| StoreError::rejected(e, "get_all_listings"))?;
        let data = self.data.read().await;

        Ok(search.apply(&data.listings, &data.reviews))
    }

    async fn add_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        listing.validate().map_err(|e| StoreError::rejected(e, "add_listing"))?;
        let cost_per_night = to_cents(listing.cost_per_night)
            .ok_or(StoreError::CostOutOfRange(listing.cost_per_night))?;

        let mut data = self.data.write().await;

        // Mirrors the owner_id foreign key on properties
        if !data.users.iter().any(|u| u.id == listing.owner_id) {
            tracing::warn!("Rejected listing for unknown owner {}", listing.owner_id);
            return Err(StoreError::UnknownOwner(listing.owner_id));
        }

        let created = Listing {
            id: next_id(data.listings.iter().map(|l| l.id), "properties")?,
            owner_id: listing.owner_id,
            title: listing.title.clone(),
            description: listing.description.clone(),
            thumbnail_photo_url: listing.thumbnail_photo_url.clone(),
            cover_photo_url: listing.cover_photo_url.clone(),
            cost_per_night,
            parking_spaces: listing.parking_spaces,
            number_of_bathrooms: listing.number_of_bathrooms,
            number_of_bedrooms: listing.number_of_bedrooms,
            country: listing.country.clone(),
            street: listing.street.clone(),
            city: listing.city.clone(),
            province: listing.province.clone(),
            post_code: listing.post_code.clone(),
            active: true,
        };
        data.listings.push(created.clone());

        tracing::info!("Created listing {} for owner {}", created.id, created.owner_id);

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let store = FixtureStore::from_json("{}").unwrap();
        let snapshot = tokio_test::block_on(store.snapshot());

        assert!(snapshot.users.is_empty());
        assert!(snapshot.listings.is_empty());
    }

    #[test]
    fn test_malformed_document() {
        let result = FixtureStore::from_json("{\"users\": 3}");
        assert!(matches!(result, Err(StoreError::FixtureError(_))));
    }

    #[test]
    fn test_add_user_assigns_next_id() {
        let store = FixtureStore::new(FixtureSet::default());
        let user = NewUser {
            name: "Erin".to_string(),
            email: "Erin@Example.com".to_string(),
            password: "hash".to_string(),
        };

        let created = tokio_test::block_on(store.add_user(&user)).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.email, "erin@example.com");
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(Vec::new(), "users").unwrap(), 1);
        assert_eq!(next_id(vec![3, 9, 4], "users").unwrap(), 10);
        assert!(matches!(
            next_id(vec![i32::MAX], "users"),
            Err(StoreError::IdOverflow("users"))
        ));
    }

    #[test]
    fn test_add_user_when_ids_are_exhausted() {
        let store = FixtureStore::new(FixtureSet {
            users: vec![User {
                id: i32::MAX,
                name: "Last".to_string(),
                email: "last@example.com".to_string(),
                password: "hash".to_string(),
            }],
            ..FixtureSet::default()
        });
        let user = NewUser {
            name: "Frank".to_string(),
            email: "frank@example.com".to_string(),
            password: "hash".to_string(),
        };

        let result = tokio_test::block_on(store.add_user(&user));
        assert!(matches!(result, Err(StoreError::IdOverflow("users"))));
        assert_eq!(tokio_test::block_on(store.snapshot()).users.len(), 1);
    }
}
