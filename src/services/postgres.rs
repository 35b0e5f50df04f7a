use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use validator::Validate;

use super::{RentalStore, StoreError};
use crate::config::DatabaseSettings;
use crate::core::ListingQuery;
use crate::models::{
    to_cents, GuestReservation, Listing, ListingFilter, ListingWithRating, NewListing, NewUser,
    ReservationRequest, User,
};

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// PostgreSQL-backed data-access handle
///
/// Owns the connection pool for the lifetime of the process: construct it
/// once at startup, pass it to whatever needs data, and `close` it at
/// shutdown.
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool; migrations are left to the caller
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    /// Close every pooled connection. Further calls fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

impl RentalStore for PostgresClient {
    async fn get_user_with_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT * FROM users
            WHERE email = $1
        "#;

        let user = sqlx::query_as::<_, User>(query)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user by email: {}", e);
                StoreError::from(e)
            })?;

        Ok(user)
    }

    async fn get_user_with_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT * FROM users
            WHERE id = $1
        "#;

        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user {}: {}", id, e);
                StoreError::from(e)
            })?;

        Ok(user)
    }

    async fn add_user(&self, user: &NewUser) -> Result<User, StoreError> {
        user.validate().map_err(|e| StoreError::rejected(e, "add_user"))?;

        let query = r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING *
        "#;

        let email = user.email.to_lowercase();
        let created = sqlx::query_as::<_, User>(query)
            .bind(&user.name)
            .bind(&email)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match StoreError::from_insert_user(e, &email) {
                StoreError::DuplicateEmail(email) => {
                    tracing::warn!("Rejected duplicate registration for {}", email);
                    StoreError::DuplicateEmail(email)
                }
                err => {
                    tracing::error!("Failed to insert user {}: {}", email, err);
                    err
                }
            })?;

        tracing::debug!("Created user {} ({})", created.id, created.email);

        Ok(created)
    }

    async fn get_all_reservations(
        &self,
        request: &ReservationRequest,
    ) -> Result<Vec<GuestReservation>, StoreError> {
        request.validate().map_err(|e| StoreError::rejected(e, "get_all_reservations"))?;
        let guest_id = request.guest_id;

        let query = r#"
            SELECT reservations.id AS reservation_id,
                   reservations.start_date,
                   reservations.end_date,
                   properties.*,
                   AVG(property_reviews.rating)::float8 AS average_rating
            FROM reservations
            JOIN properties ON reservations.property_id = properties.id
            JOIN property_reviews ON properties.id = property_reviews.property_id
            WHERE reservations.guest_id = $1
            GROUP BY properties.id, reservations.id
            ORDER BY reservations.start_date DESC
            LIMIT $2
        "#;

        let reservations = sqlx::query_as::<_, GuestReservation>(query)
            .bind(guest_id)
            .bind(request.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reservations for guest {}: {}", guest_id, e);
                StoreError::from(e)
            })?;

        tracing::debug!("Guest {} has {} reservations", guest_id, reservations.len());

        Ok(reservations)
    }

    async fn get_all_listings(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithRating>, StoreError> {
        let search = ListingQuery::from_filter(filter)
            .map_err(|e| StoreError::rejected(e, "get_all_listings"))?;
        let mut builder = search.to_query_builder();

        tracing::debug!(
            predicates = search.predicates().len(),
            limit = search.limit(),
            "Searching listings: {}",
            builder.sql()
        );

        let listings = builder
            .build_query_as::<ListingWithRating>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Listing search failed: {}", e);
                StoreError::from(e)
            })?;

        Ok(listings)
    }

    async fn add_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        listing.validate().map_err(|e| StoreError::rejected(e, "add_listing"))?;
        let cost_per_night = to_cents(listing.cost_per_night)
            .ok_or(StoreError::CostOutOfRange(listing.cost_per_night))?;

        let query = r#"
            INSERT INTO properties (
                owner_id, title, description, thumbnail_photo_url, cover_photo_url,
                cost_per_night, street, city, province, post_code, country,
                parking_spaces, number_of_bathrooms, number_of_bedrooms
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
        "#;

        let created = sqlx::query_as::<_, Listing>(query)
            .bind(listing.owner_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.thumbnail_photo_url)
            .bind(&listing.cover_photo_url)
            .bind(cost_per_night)
            .bind(&listing.street)
            .bind(&listing.city)
            .bind(&listing.province)
            .bind(&listing.post_code)
            .bind(&listing.country)
            .bind(listing.parking_spaces)
            .bind(listing.number_of_bathrooms)
            .bind(listing.number_of_bedrooms)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match StoreError::from_insert_listing(e, listing.owner_id) {
                StoreError::UnknownOwner(owner_id) => {
                    tracing::warn!("Rejected listing for unknown owner {}", owner_id);
                    StoreError::UnknownOwner(owner_id)
                }
                err => {
                    tracing::error!("Failed to insert listing for owner {}: {}", listing.owner_id, err);
                    err
                }
            })?;

        tracing::info!("Created listing {} for owner {}", created.id, created.owner_id);

        Ok(created)
    }
}
