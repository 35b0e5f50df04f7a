use sqlx::{Postgres, QueryBuilder};
use validator::{Validate, ValidationErrors};

use super::filters::ListingPredicate;
use super::rating::{average_rating, meets_minimum_rating};
use crate::models::{Listing, ListingFilter, ListingWithRating, Review};

/// Listings joined with their reviews, averaged per listing
pub const LISTING_SELECT: &str = "SELECT properties.*, AVG(property_reviews.rating)::float8 AS average_rating \
     FROM properties \
     JOIN property_reviews ON properties.id = property_reviews.property_id";

/// A validated listing search
///
/// Built once from a `ListingFilter`; it can be rendered to a parameterized
/// statement for PostgreSQL or evaluated directly against in-memory tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    predicates: Vec<ListingPredicate>,
    minimum_rating: Option<f64>,
    limit: i64,
}

impl ListingQuery {
    pub fn from_filter(filter: &ListingFilter) -> Result<Self, ValidationErrors> {
        filter.validate()?;

        Ok(Self {
            predicates: ListingPredicate::from_filter(filter),
            minimum_rating: filter.minimum_rating,
            limit: filter.limit,
        })
    }

    pub fn predicates(&self) -> &[ListingPredicate] {
        &self.predicates
    }

    pub fn minimum_rating(&self) -> Option<f64> {
        self.minimum_rating
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Render the search as one parameterized statement.
    ///
    /// Predicates are joined into a single WHERE clause, the rating bound
    /// goes into HAVING, and the cap is always the last bind parameter.
    pub fn to_query_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(LISTING_SELECT);

        for (index, predicate) in self.predicates.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(&mut builder);
        }

        builder.push(" GROUP BY properties.id");

        if let Some(minimum) = self.minimum_rating {
            builder.push(" HAVING AVG(property_reviews.rating) >= ");
            builder.push_bind(minimum);
        }

        builder.push(" ORDER BY properties.cost_per_night ASC, properties.id ASC LIMIT ");
        builder.push_bind(self.limit);

        builder
    }

    /// Evaluate the search over in-memory tables with the same semantics as
    /// the SQL statement: inner join on reviews, per-listing average,
    /// rating bound after aggregation, cheapest first, capped.
    pub fn apply<'a, I>(&self, listings: I, reviews: &[Review]) -> Vec<ListingWithRating>
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let mut rows: Vec<ListingWithRating> = listings
            .into_iter()
            .filter(|listing| self.predicates.iter().all(|p| p.matches(listing)))
            .filter_map(|listing| {
                let average = average_rating(
                    reviews
                        .iter()
                        .filter(|review| review.property_id == listing.id)
                        .map(|review| review.rating),
                )?;
                Some(ListingWithRating {
                    listing: listing.clone(),
                    average_rating: average,
                })
            })
            .filter(|row| meets_minimum_rating(row.average_rating, self.minimum_rating))
            .collect();

        rows.sort_by(|a, b| {
            a.listing
                .cost_per_night
                .cmp(&b.listing.cost_per_night)
                .then(a.listing.id.cmp(&b.listing.id))
        });
        rows.truncate(usize::try_from(self.limit).unwrap_or(0));

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &ListingFilter) -> String {
        ListingQuery::from_filter(filter)
            .unwrap()
            .to_query_builder()
            .sql()
            .to_string()
    }

    #[test]
    fn test_no_criteria_has_no_where_clause() {
        let sql = sql_for(&ListingFilter::new());

        assert_eq!(
            sql,
            format!(
                "{} GROUP BY properties.id ORDER BY properties.cost_per_night ASC, properties.id ASC LIMIT $1",
                LISTING_SELECT
            )
        );
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("HAVING"));
    }

    #[test]
    fn test_first_predicate_opens_where_clause() {
        let sql = sql_for(&ListingFilter::new().with_owner(7));

        assert!(sql.contains(" WHERE properties.owner_id = $1 GROUP BY"));
        assert!(!sql.contains(" AND "));
        assert!(sql.ends_with("LIMIT $2"));
    }

    #[test]
    fn test_all_criteria() {
        let filter = ListingFilter::new()
            .with_city("Vancouver")
            .with_owner(2)
            .with_price_range(Some(50.0), Some(300.0))
            .with_minimum_rating(4.0)
            .with_limit(5);

        assert_eq!(
            sql_for(&filter),
            format!(
                "{} WHERE properties.city LIKE $1 \
                 AND properties.owner_id = $2 \
                 AND properties.cost_per_night >= $3 * 100 \
                 AND properties.cost_per_night <= $4 * 100 \
                 GROUP BY properties.id \
                 HAVING AVG(property_reviews.rating) >= $5 \
                 ORDER BY properties.cost_per_night ASC, properties.id ASC LIMIT $6",
                LISTING_SELECT
            )
        );
    }

    #[test]
    fn test_later_predicates_use_and_without_earlier_ones() {
        let sql = sql_for(&ListingFilter::new().with_price_range(None, Some(120.0)));

        assert!(sql.contains(" WHERE properties.cost_per_night <= $1 * 100 GROUP BY"));
    }

    #[test]
    fn test_rating_only_goes_to_having() {
        let sql = sql_for(&ListingFilter::new().with_minimum_rating(3.0));

        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("GROUP BY properties.id HAVING AVG(property_reviews.rating) >= $1 ORDER BY"));
        assert!(sql.ends_with("LIMIT $2"));
    }

    #[test]
    fn test_user_values_never_reach_sql_text() {
        let sql = sql_for(&ListingFilter::new().with_city("'; DROP TABLE users; --"));

        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("properties.city LIKE $1"));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        assert!(ListingQuery::from_filter(&ListingFilter::new().with_limit(0)).is_err());
        assert!(ListingQuery::from_filter(&ListingFilter::new().with_minimum_rating(0.5)).is_err());
    }
}
