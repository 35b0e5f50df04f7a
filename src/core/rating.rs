/// Mean of the given review ratings, or `None` when there are none
///
/// Mirrors `AVG(property_reviews.rating)` under an inner join: a listing
/// without reviews produces no row at all.
pub fn average_rating<I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), rating| (sum + i64::from(rating), count + 1));

    if count == 0 {
        None
    } else {
        Some(sum as f64 / f64::from(count))
    }
}

/// HAVING-style check on an aggregate
#[inline]
pub fn meets_minimum_rating(average: f64, minimum: Option<f64>) -> bool {
    minimum.map_or(true, |minimum| average >= minimum)
}
