// Model exports
pub mod domain;
pub mod requests;

pub use domain::{User, Listing, Review, Reservation, ListingWithRating, GuestReservation, to_cents};
pub use requests::{ListingFilter, NewUser, NewListing, ReservationRequest, strip_delimiters};
