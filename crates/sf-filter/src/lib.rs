#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sf_model::Booking;
use sf_table::{Table, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationFilter {
    #[default]
    Any,
    CanceledOnly,
    NotCanceledOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomChangeFilter {
    #[default]
    Any,
    ChangedOnly,
    UnchangedOnly,
}

/// A filter request: every field is independently optional and defaults
/// to "no restriction", so `FilterSpec::default()` is all-permissive.
///
/// Membership sets are exact: an empty set keeps nothing. An empty
/// selection means "exclude everything", not "ignore this filter".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FilterSpec {
    pub hotels: Option<BTreeSet<String>>,
    pub countries: Option<BTreeSet<String>>,
    pub customer_types: Option<BTreeSet<String>>,
    pub market_segments: Option<BTreeSet<String>>,
    pub cancellation: CancellationFilter,
    pub adr_range: Option<(f64, f64)>,
    pub lead_time_range: Option<(i64, i64)>,
    pub room_change: RoomChangeFilter,
}

impl FilterSpec {
    #[must_use]
    pub fn is_all_permissive(&self) -> bool {
        *self == Self::default()
    }
}

/// One compiled per-dimension predicate. Only active spec fields
/// compile to a predicate; the conjunction short-circuits per row.
#[derive(Debug, Clone, PartialEq)]
enum Predicate<'s> {
    MemberOf {
        field: SetField,
        allowed: &'s BTreeSet<String>,
    },
    AdrBetween {
        min: f64,
        max: f64,
    },
    LeadTimeBetween {
        min: i64,
        max: i64,
    },
    Canceled(bool),
    RoomChanged(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetField {
    Hotel,
    Country,
    CustomerType,
    MarketSegment,
}

impl SetField {
    fn value<'b>(self, booking: &'b Booking) -> &'b str {
        match self {
            Self::Hotel => &booking.hotel,
            Self::Country => &booking.country,
            Self::CustomerType => &booking.customer_type,
            Self::MarketSegment => &booking.market_segment,
        }
    }
}

impl Predicate<'_> {
    fn matches(&self, booking: &Booking) -> bool {
        match self {
            Self::MemberOf { field, allowed } => allowed.contains(field.value(booking)),
            // NaN adr never satisfies an inclusive range, matching the
            // comparison semantics of the original mask.
            Self::AdrBetween { min, max } => booking.adr >= *min && booking.adr <= *max,
            Self::LeadTimeBetween { min, max } => {
                booking.lead_time >= *min && booking.lead_time <= *max
            }
            Self::Canceled(wanted) => booking.is_canceled == *wanted,
            Self::RoomChanged(wanted) => booking.derived.room_change == *wanted,
        }
    }
}

fn compile(spec: &FilterSpec) -> Vec<Predicate<'_>> {
    let mut predicates = Vec::new();

    let memberships = [
        (SetField::Hotel, spec.hotels.as_ref()),
        (SetField::Country, spec.countries.as_ref()),
        (SetField::CustomerType, spec.customer_types.as_ref()),
        (SetField::MarketSegment, spec.market_segments.as_ref()),
    ];
    for (field, allowed) in memberships {
        if let Some(allowed) = allowed {
            predicates.push(Predicate::MemberOf { field, allowed });
        }
    }

    if let Some((min, max)) = spec.adr_range {
        predicates.push(Predicate::AdrBetween { min, max });
    }
    if let Some((min, max)) = spec.lead_time_range {
        predicates.push(Predicate::LeadTimeBetween { min, max });
    }

    match spec.cancellation {
        CancellationFilter::Any => {}
        CancellationFilter::CanceledOnly => predicates.push(Predicate::Canceled(true)),
        CancellationFilter::NotCanceledOnly => predicates.push(Predicate::Canceled(false)),
    }
    match spec.room_change {
        RoomChangeFilter::Any => {}
        RoomChangeFilter::ChangedOnly => predicates.push(Predicate::RoomChanged(true)),
        RoomChangeFilter::UnchangedOnly => predicates.push(Predicate::RoomChanged(false)),
    }

    predicates
}

/// Evaluate the spec against every row, producing a view over the rows
/// that satisfy all active predicates, in canonical order. Pure: the
/// same spec on the same table always yields an equal view.
#[must_use]
pub fn apply_filters<'t>(table: &'t Table, spec: &FilterSpec) -> View<'t> {
    let predicates = compile(spec);

    let positions = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, booking)| predicates.iter().all(|predicate| predicate.matches(booking)))
        .map(|(position, _)| position)
        .collect();

    table.view_of(positions)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use sf_model::RawBooking;
    use sf_table::Table;

    use super::{CancellationFilter, FilterSpec, RoomChangeFilter, apply_filters};

    fn raw_row(hotel: &str, adr: f64, lead_time: i64) -> RawBooking {
        RawBooking {
            hotel: hotel.to_owned(),
            is_canceled: false,
            lead_time,
            arrival_year: 2016,
            arrival_month: "July".to_owned(),
            arrival_day: 3,
            weekend_nights: 1,
            week_nights: 2,
            adults: 2,
            children: 0,
            babies: 0,
            country: Some("PRT".to_owned()),
            market_segment: "Direct".to_owned(),
            customer_type: "Transient".to_owned(),
            adr,
            reserved_room_type: "A".to_owned(),
            assigned_room_type: "A".to_owned(),
            booking_changes: 0,
            agent: 0,
            reservation_status: "Check-Out".to_owned(),
            reservation_status_date: None,
        }
    }

    fn scenario_table() -> Table {
        Table::from_raw(vec![
            raw_row("Resort Hotel", 100.0, 10),
            raw_row("City Hotel", 50.0, 5),
            raw_row("Resort Hotel", 200.0, 30),
        ])
    }

    fn set_of(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn default_spec_keeps_every_row_in_canonical_order() {
        let table = scenario_table();
        let view = apply_filters(&table, &FilterSpec::default());
        assert_eq!(view.positions(), &[0, 1, 2]);
    }

    #[test]
    fn adr_range_is_inclusive_on_both_ends() {
        let table = scenario_table();
        let spec = FilterSpec {
            adr_range: Some((60.0, 250.0)),
            ..FilterSpec::default()
        };

        let view = apply_filters(&table, &spec);
        assert_eq!(view.positions(), &[0, 2]);

        let exact = FilterSpec {
            adr_range: Some((50.0, 100.0)),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table, &exact).positions(), &[0, 1]);
    }

    #[test]
    fn empty_hotel_set_excludes_every_row() {
        let table = scenario_table();
        let spec = FilterSpec {
            hotels: Some(BTreeSet::new()),
            // Other permissive settings must not resurrect rows.
            adr_range: Some((0.0, 1000.0)),
            ..FilterSpec::default()
        };

        assert!(apply_filters(&table, &spec).is_empty());
    }

    #[test]
    fn membership_and_range_predicates_conjoin() {
        let table = scenario_table();
        let spec = FilterSpec {
            hotels: Some(set_of(&["Resort Hotel"])),
            lead_time_range: Some((0, 15)),
            ..FilterSpec::default()
        };

        let view = apply_filters(&table, &spec);
        assert_eq!(view.positions(), &[0]);
    }

    #[test]
    fn cancellation_tri_state_selects_exactly() {
        let mut rows = vec![raw_row("Resort Hotel", 100.0, 10)];
        let mut canceled = raw_row("City Hotel", 80.0, 3);
        canceled.is_canceled = true;
        rows.push(canceled);
        let table = Table::from_raw(rows);

        let canceled_only = FilterSpec {
            cancellation: CancellationFilter::CanceledOnly,
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table, &canceled_only).positions(), &[1]);

        let kept = FilterSpec {
            cancellation: CancellationFilter::NotCanceledOnly,
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table, &kept).positions(), &[0]);
    }

    #[test]
    fn room_change_tri_state_selects_exactly() {
        let mut rows = vec![raw_row("Resort Hotel", 100.0, 10)];
        let mut moved = raw_row("City Hotel", 80.0, 3);
        moved.assigned_room_type = "D".to_owned();
        rows.push(moved);
        let table = Table::from_raw(rows);

        let changed = FilterSpec {
            room_change: RoomChangeFilter::ChangedOnly,
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table, &changed).positions(), &[1]);

        let unchanged = FilterSpec {
            room_change: RoomChangeFilter::UnchangedOnly,
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&table, &unchanged).positions(), &[0]);
    }

    #[test]
    fn apply_filters_is_idempotent_by_value() {
        let table = scenario_table();
        let spec = FilterSpec {
            adr_range: Some((60.0, 250.0)),
            ..FilterSpec::default()
        };

        let first = apply_filters(&table, &spec);
        let second = apply_filters(&table, &spec);
        assert_eq!(first, second);
    }

    #[test]
    fn spec_deserializes_from_partial_json_fragment() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"hotels": ["Resort Hotel"], "cancellation": "canceled_only"}"#,
        )
        .expect("fragment parses");

        assert_eq!(spec.hotels, Some(set_of(&["Resort Hotel"])));
        assert_eq!(spec.cancellation, CancellationFilter::CanceledOnly);
        assert_eq!(spec.adr_range, None);
        assert_eq!(spec.room_change, RoomChangeFilter::Any);
    }
}
