#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sf_model::Booking;
use sf_table::View;

/// Label of one group in an aggregate series. Float keys compare and
/// hash by bit pattern so NaN-keyed groups collapse into one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GroupKey {
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float64(a), Self::Float64(b)) => normal_bits(*a) == normal_bits(*b),
            (Self::Utf8(a), Self::Utf8(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Int64(v) => {
                0_u8.hash(state);
                v.hash(state);
            }
            Self::Float64(v) => {
                1_u8.hash(state);
                normal_bits(*v).hash(state);
            }
            Self::Utf8(v) => {
                2_u8.hash(state);
                v.hash(state);
            }
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Float64(a), Self::Float64(b)) => a.total_cmp(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
            (Self::Int64(_), _) => Ordering::Less,
            (_, Self::Int64(_)) => Ordering::Greater,
            (Self::Float64(_), _) => Ordering::Less,
            (_, Self::Float64(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_owned())
    }
}

fn normal_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

/// Numeric measure access. Boolean fields contribute 0/1 so their mean
/// is a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureField {
    LeadTime,
    Adr,
    WeekendNights,
    WeekNights,
    Adults,
    Children,
    Babies,
    BookingChanges,
    TotalStayNights,
    TotalMembers,
    RevenueGenerated,
    IsCanceled,
    RoomChange,
}

impl MeasureField {
    #[must_use]
    pub fn value(self, booking: &Booking) -> f64 {
        match self {
            Self::LeadTime => booking.lead_time as f64,
            Self::Adr => booking.adr,
            Self::WeekendNights => booking.weekend_nights as f64,
            Self::WeekNights => booking.week_nights as f64,
            Self::Adults => booking.adults as f64,
            Self::Children => booking.children as f64,
            Self::Babies => booking.babies as f64,
            Self::BookingChanges => booking.booking_changes as f64,
            Self::TotalStayNights => booking.derived.total_stay_nights as f64,
            Self::TotalMembers => booking.derived.total_members as f64,
            Self::RevenueGenerated => booking.derived.revenue_generated,
            Self::IsCanceled => {
                if booking.is_canceled {
                    1.0
                } else {
                    0.0
                }
            }
            Self::RoomChange => {
                if booking.derived.room_change {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Grouping dimension access. Rows whose dimension value is unresolved
/// (`None`) are dropped from grouping, so no group ever represents
/// "no value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionField {
    Hotel,
    Country,
    CustomerType,
    MarketSegment,
    ReservationStatus,
    ReservedRoomType,
    AssignedRoomType,
    ArrivalDayName,
    TotalStayNights,
    LeadTime,
    Adr,
}

impl DimensionField {
    #[must_use]
    pub fn key(self, booking: &Booking) -> Option<GroupKey> {
        match self {
            Self::Hotel => Some(GroupKey::Utf8(booking.hotel.clone())),
            Self::Country => Some(GroupKey::Utf8(booking.country.clone())),
            Self::CustomerType => Some(GroupKey::Utf8(booking.customer_type.clone())),
            Self::MarketSegment => Some(GroupKey::Utf8(booking.market_segment.clone())),
            Self::ReservationStatus => Some(GroupKey::Utf8(booking.reservation_status.clone())),
            Self::ReservedRoomType => Some(GroupKey::Utf8(booking.reserved_room_type.clone())),
            Self::AssignedRoomType => Some(GroupKey::Utf8(booking.assigned_room_type.clone())),
            Self::ArrivalDayName => booking
                .derived
                .arrival_day_name
                .clone()
                .map(GroupKey::Utf8),
            Self::TotalStayNights => Some(GroupKey::Int64(booking.derived.total_stay_nights)),
            Self::LeadTime => Some(GroupKey::Int64(booking.lead_time)),
            Self::Adr => Some(GroupKey::Float64(booking.adr)),
        }
    }
}

#[must_use]
pub fn count(view: &View<'_>) -> usize {
    view.len()
}

/// NaN-safe mean: NaN measures are skipped, and an empty contribution
/// set yields `None` (the explicit no-data marker), never 0.0.
#[must_use]
pub fn mean(view: &View<'_>, field: MeasureField) -> Option<f64> {
    let mut sum = 0.0;
    let mut contributing = 0_usize;
    for booking in view.iter() {
        let value = field.value(booking);
        if value.is_nan() {
            continue;
        }
        sum += value;
        contributing += 1;
    }

    (contributing > 0).then(|| sum / contributing as f64)
}

/// NaN-skipping sum; an empty view sums to 0.0 (a sum of nothing is a
/// real zero, unlike a mean of nothing).
#[must_use]
pub fn sum(view: &View<'_>, field: MeasureField) -> f64 {
    view.iter()
        .map(|booking| field.value(booking))
        .filter(|value| !value.is_nan())
        .sum()
}

/// First-seen-order grouping skeleton shared by the grouped aggregates.
fn accumulate<A, F>(view: &View<'_>, dimension: DimensionField, mut fold: F) -> Vec<(GroupKey, A)>
where
    A: Default,
    F: FnMut(&mut A, &Booking),
{
    let mut ordered: Vec<(GroupKey, A)> = Vec::new();
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();

    for booking in view.iter() {
        let Some(key) = dimension.key(booking) else {
            continue;
        };

        let slot = match slots.get(&key) {
            Some(slot) => *slot,
            None => {
                ordered.push((key.clone(), A::default()));
                slots.insert(key, ordered.len() - 1);
                ordered.len() - 1
            }
        };

        fold(&mut ordered[slot].1, booking);
    }

    ordered
}

/// Per-group mean of `measure`, one entry per dimension value present in
/// the view, in first-seen order. A group whose every measure is NaN
/// keeps its entry with a NaN mean.
#[must_use]
pub fn group_by_mean(
    view: &View<'_>,
    dimension: DimensionField,
    measure: MeasureField,
) -> Vec<(GroupKey, f64)> {
    let grouped = accumulate::<(f64, usize), _>(view, dimension, |acc, booking| {
        let value = measure.value(booking);
        if !value.is_nan() {
            acc.0 += value;
            acc.1 += 1;
        }
    });

    grouped
        .into_iter()
        .map(|(key, (total, contributing))| {
            let mean = if contributing > 0 {
                total / contributing as f64
            } else {
                f64::NAN
            };
            (key, mean)
        })
        .collect()
}

#[must_use]
pub fn group_by_sum(
    view: &View<'_>,
    dimension: DimensionField,
    measure: MeasureField,
) -> Vec<(GroupKey, f64)> {
    accumulate::<f64, _>(view, dimension, |acc, booking| {
        let value = measure.value(booking);
        if !value.is_nan() {
            *acc += value;
        }
    })
}

#[must_use]
pub fn group_by_count(view: &View<'_>, dimension: DimensionField) -> Vec<(GroupKey, usize)> {
    accumulate::<usize, _>(view, dimension, |acc, _| *acc += 1)
}

/// Distinct values with their frequencies, descending by count; ties
/// keep first-encountered order (stable sort over the first-seen
/// sequence). `top_n` truncates after ordering.
#[must_use]
pub fn value_counts(
    view: &View<'_>,
    dimension: DimensionField,
    top_n: Option<usize>,
) -> Vec<(GroupKey, usize)> {
    let mut counts = group_by_count(view, dimension);
    counts.sort_by(|left, right| right.1.cmp(&left.1));
    if let Some(top_n) = top_n {
        counts.truncate(top_n);
    }
    counts
}

/// The metric tiles of the dashboard. `None` means the filtered view had
/// no data to average; render a neutral placeholder, never `0.00`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    pub total_bookings: usize,
    pub average_daily_rate: Option<f64>,
    pub average_stay_nights: Option<f64>,
    pub total_revenue: f64,
    pub total_guests: i64,
    pub cancellation_rate: Option<f64>,
    pub room_change_rate: Option<f64>,
}

impl BusinessMetrics {
    #[must_use]
    pub fn compute(view: &View<'_>) -> Self {
        Self {
            total_bookings: count(view),
            average_daily_rate: mean(view, MeasureField::Adr),
            average_stay_nights: mean(view, MeasureField::TotalStayNights),
            total_revenue: sum(view, MeasureField::RevenueGenerated),
            // The one integral metric accumulates on the typed field so
            // the guest count stays exact; saturating, like the
            // per-row totals it sums.
            total_guests: view
                .iter()
                .fold(0_i64, |acc, booking| {
                    acc.saturating_add(booking.derived.total_members)
                }),
            cancellation_rate: mean(view, MeasureField::IsCanceled).map(|rate| rate * 100.0),
            room_change_rate: mean(view, MeasureField::RoomChange).map(|rate| rate * 100.0),
        }
    }
}

/// Earliest and latest resolved arrival date in the view; `None` when no
/// row has a resolved arrival date.
#[must_use]
pub fn arrival_span(view: &View<'_>) -> Option<(NaiveDate, NaiveDate)> {
    let mut span: Option<(NaiveDate, NaiveDate)> = None;
    for booking in view.iter() {
        let Some(date) = booking.derived.arrival_date else {
            continue;
        };
        span = Some(match span {
            Some((min, max)) => (min.min(date), max.max(date)),
            None => (date, date),
        });
    }
    span
}
