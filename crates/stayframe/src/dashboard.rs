//! The named aggregate series behind the dashboard's charts, each a thin
//! composition of the `sf-agg` primitives over a filtered view.

use sf_agg::{DimensionField, GroupKey, MeasureField, group_by_mean, group_by_sum, value_counts};
use sf_table::View;

/// Bookings per hotel type, most frequent first.
#[must_use]
pub fn bookings_by_hotel(view: &View<'_>) -> Vec<(GroupKey, usize)> {
    value_counts(view, DimensionField::Hotel, None)
}

/// The `n` most frequent guest countries.
#[must_use]
pub fn top_countries(view: &View<'_>, n: usize) -> Vec<(GroupKey, usize)> {
    value_counts(view, DimensionField::Country, Some(n))
}

/// Arrivals per weekday name; rows with unresolved arrival dates are
/// absent rather than lumped into a synthetic bucket.
#[must_use]
pub fn arrival_day_distribution(view: &View<'_>) -> Vec<(GroupKey, usize)> {
    value_counts(view, DimensionField::ArrivalDayName, None)
}

/// Frequency of each observed daily rate, ascending by rate (the area
/// chart wants an ordered x axis, not a ranking).
#[must_use]
pub fn adr_distribution(view: &View<'_>) -> Vec<(GroupKey, usize)> {
    let mut counts = value_counts(view, DimensionField::Adr, None);
    counts.sort_by(|left, right| left.0.cmp(&right.0));
    counts
}

/// Total revenue per stay length in nights.
#[must_use]
pub fn revenue_by_stay_length(view: &View<'_>) -> Vec<(GroupKey, f64)> {
    group_by_sum(
        view,
        DimensionField::TotalStayNights,
        MeasureField::RevenueGenerated,
    )
}

/// Mean number of booking changes per lead time.
#[must_use]
pub fn booking_changes_by_lead_time(view: &View<'_>) -> Vec<(GroupKey, f64)> {
    group_by_mean(view, DimensionField::LeadTime, MeasureField::BookingChanges)
}

/// Mean daily rate per customer type.
#[must_use]
pub fn adr_by_customer_type(view: &View<'_>) -> Vec<(GroupKey, f64)> {
    group_by_mean(view, DimensionField::CustomerType, MeasureField::Adr)
}

/// Cancellation rate (0..1) per customer type.
#[must_use]
pub fn cancellation_rate_by_customer_type(view: &View<'_>) -> Vec<(GroupKey, f64)> {
    group_by_mean(view, DimensionField::CustomerType, MeasureField::IsCanceled)
}

/// Mean lead time per market segment.
#[must_use]
pub fn lead_time_by_market_segment(view: &View<'_>) -> Vec<(GroupKey, f64)> {
    group_by_mean(view, DimensionField::MarketSegment, MeasureField::LeadTime)
}
