use sqlx::{Postgres, QueryBuilder};

use crate::models::{Listing, ListingFilter};

/// A single listing constraint applied before aggregation
///
/// Each predicate knows how to render itself as a parameterized SQL
/// fragment and how to test an in-memory listing; the two must agree.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingPredicate {
    /// Case-sensitive substring of `city`
    CityContains(String),
    OwnedBy(i32),
    /// Inclusive lower bound, in currency units
    MinimumCost(f64),
    /// Inclusive upper bound, in currency units
    MaximumCost(f64),
}

impl ListingPredicate {
    /// Predicates for every criterion present in `filter`, always in the
    /// order city, owner, minimum cost, maximum cost.
    pub fn from_filter(filter: &ListingFilter) -> Vec<Self> {
        let mut predicates = Vec::with_capacity(4);

        if let Some(city) = &filter.city {
            predicates.push(Self::CityContains(city.clone()));
        }
        if let Some(owner_id) = filter.owner_id {
            predicates.push(Self::OwnedBy(owner_id));
        }
        if let Some(minimum) = filter.minimum_price_per_night {
            predicates.push(Self::MinimumCost(minimum));
        }
        if let Some(maximum) = filter.maximum_price_per_night {
            predicates.push(Self::MaximumCost(maximum));
        }

        predicates
    }

    /// Append this predicate (without any leading keyword) to `builder`.
    /// User values only ever go through `push_bind`.
    pub fn push_sql<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        match self {
            Self::CityContains(city) => {
                builder.push("properties.city LIKE ");
                builder.push_bind(like_pattern(city));
            }
            Self::OwnedBy(owner_id) => {
                builder.push("properties.owner_id = ");
                builder.push_bind(*owner_id);
            }
            Self::MinimumCost(minimum) => {
                builder.push("properties.cost_per_night >= ");
                builder.push_bind(*minimum);
                builder.push(" * 100");
            }
            Self::MaximumCost(maximum) => {
                builder.push("properties.cost_per_night <= ");
                builder.push_bind(*maximum);
                builder.push(" * 100");
            }
        }
    }

    /// In-memory equivalent of the SQL fragment
    #[inline]
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::CityContains(city) => listing.city.contains(city.as_str()),
            Self::OwnedBy(owner_id) => listing.owner_id == *owner_id,
            Self::MinimumCost(minimum) => f64::from(listing.cost_per_night) >= minimum * 100.0,
            Self::MaximumCost(maximum) => f64::from(listing.cost_per_night) <= maximum * 100.0,
        }
    }
}

/// Wrap `substring` in `%` wildcards, escaping LIKE metacharacters so the
/// substring itself matches literally.
pub fn like_pattern(substring: &str) -> String {
    let mut pattern = String::with_capacity(substring.len() + 2);
    pattern.push('%');
    for ch in substring.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_listing(city: &str, owner_id: i32, cost_per_night: i32) -> Listing {
        Listing {
            id: 1,
            owner_id,
            title: "Test Listing".to_string(),
            description: String::new(),
            thumbnail_photo_url: String::new(),
            cover_photo_url: String::new(),
            cost_per_night,
            parking_spaces: 0,
            number_of_bathrooms: 1,
            number_of_bedrooms: 1,
            country: "Canada".to_string(),
            street: "1 Main St".to_string(),
            city: city.to_string(),
            province: "British Columbia".to_string(),
            post_code: "V5K 0A1".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_predicate_order_is_fixed() {
        let filter = ListingFilter {
            city: Some("Vancouver".to_string()),
            owner_id: Some(4),
            minimum_price_per_night: Some(50.0),
            maximum_price_per_night: Some(200.0),
            minimum_rating: Some(4.0),
            limit: 10,
        };

        assert_eq!(
            ListingPredicate::from_filter(&filter),
            vec![
                ListingPredicate::CityContains("Vancouver".to_string()),
                ListingPredicate::OwnedBy(4),
                ListingPredicate::MinimumCost(50.0),
                ListingPredicate::MaximumCost(200.0),
            ]
        );
    }

    #[test]
    fn test_empty_filter_has_no_predicates() {
        assert!(ListingPredicate::from_filter(&ListingFilter::new()).is_empty());
    }

    #[test]
    fn test_city_match_is_case_sensitive() {
        let predicate = ListingPredicate::CityContains("Vancouver".to_string());

        assert!(predicate.matches(&create_test_listing("North Vancouver", 1, 100)));
        assert!(!predicate.matches(&create_test_listing("west vancouver", 1, 100)));
    }

    #[test]
    fn test_cost_bounds_are_inclusive() {
        let listing = create_test_listing("Ottawa", 1, 9500);

        assert!(ListingPredicate::MinimumCost(95.0).matches(&listing));
        assert!(ListingPredicate::MaximumCost(95.0).matches(&listing));
        assert!(!ListingPredicate::MinimumCost(95.01).matches(&listing));
        assert!(!ListingPredicate::MaximumCost(94.99).matches(&listing));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Vancouver"), "%Vancouver%");
        assert_eq!(like_pattern("100%_ok"), "%100\\%\\_ok%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_push_sql_binds_values() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE ");
        ListingPredicate::MinimumCost(80.0).push_sql(&mut builder);

        assert_eq!(builder.sql(), "SELECT 1 WHERE properties.cost_per_night >= $1 * 100");
    }
}
