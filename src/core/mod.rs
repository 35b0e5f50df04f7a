// Listing search exports
pub mod filters;
pub mod rating;
pub mod search;

pub use filters::{ListingPredicate, like_pattern};
pub use rating::{average_rating, meets_minimum_rating};
pub use search::{ListingQuery, LISTING_SELECT};
