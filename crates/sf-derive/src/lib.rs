#![forbid(unsafe_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use sf_model::{DerivedFields, RawBooking};

/// Compute every derived field for one raw row.
///
/// Pure and total: unresolvable inputs degrade to `None`/NaN, the row is
/// never rejected here. `total_stay_nights` is computed before
/// `revenue_generated`, and `arrival_date` before its dependents; no
/// other ordering matters.
#[must_use]
pub fn derive(raw: &RawBooking) -> DerivedFields {
    let arrival_date = arrival_date(raw.arrival_year, &raw.arrival_month, raw.arrival_day);
    let arrival_day_name = arrival_date.map(|date| day_name(date.weekday()).to_owned());

    // Saturating sums keep the function total even for absurd but
    // parseable night/occupant counts.
    let total_stay_nights = raw.weekend_nights.saturating_add(raw.week_nights);
    let departure_date = arrival_date.and_then(|date| {
        Duration::try_days(total_stay_nights)
            .and_then(|nights| date.checked_add_signed(nights))
    });

    DerivedFields {
        arrival_date,
        arrival_day_name,
        total_stay_nights,
        departure_date,
        total_members: raw
            .adults
            .saturating_add(raw.children)
            .saturating_add(raw.babies),
        revenue_generated: raw.adr * total_stay_nights as f64,
        room_change: raw.reserved_room_type != raw.assigned_room_type,
    }
}

/// Assemble a calendar date from (year, English month name, day).
/// Unknown month tokens (numeric strings included) and out-of-range
/// day/year combinations yield `None`.
#[must_use]
pub fn arrival_date(year: i64, month: &str, day: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    let month = parse_month_name(month)?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Full English month names only, ASCII case-insensitive. This mirrors
/// the upstream date format, which never accepted numeric months.
#[must_use]
pub fn parse_month_name(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];

    let token = token.trim();
    MONTHS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(token))
        .map(|idx| idx as u32 + 1)
}

#[must_use]
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sf_model::RawBooking;

    use super::{arrival_date, derive, parse_month_name};

    fn raw_row() -> RawBooking {
        RawBooking {
            hotel: "City Hotel".to_owned(),
            is_canceled: false,
            lead_time: 40,
            arrival_year: 2016,
            arrival_month: "December".to_owned(),
            arrival_day: 5,
            weekend_nights: 2,
            week_nights: 3,
            adults: 2,
            children: 1,
            babies: 0,
            country: Some("PRT".to_owned()),
            market_segment: "Online TA".to_owned(),
            customer_type: "Transient".to_owned(),
            adr: 80.5,
            reserved_room_type: "A".to_owned(),
            assigned_room_type: "D".to_owned(),
            booking_changes: 1,
            agent: 9,
            reservation_status: "Check-Out".to_owned(),
            reservation_status_date: None,
        }
    }

    #[test]
    fn december_fifth_resolves_and_cascades() {
        let derived = derive(&raw_row());
        let expected = NaiveDate::from_ymd_opt(2016, 12, 5).expect("valid date");

        assert_eq!(derived.arrival_date, Some(expected));
        assert_eq!(derived.arrival_day_name.as_deref(), Some("Monday"));
        assert_eq!(derived.total_stay_nights, 5);
        assert_eq!(
            derived.departure_date,
            NaiveDate::from_ymd_opt(2016, 12, 10)
        );
    }

    #[test]
    fn numeric_month_token_leaves_date_fields_unresolved() {
        let mut raw = raw_row();
        raw.arrival_month = "13".to_owned();

        let derived = derive(&raw);
        assert_eq!(derived.arrival_date, None);
        assert_eq!(derived.arrival_day_name, None);
        assert_eq!(derived.departure_date, None);
        // Non-date derivations are unaffected.
        assert_eq!(derived.total_stay_nights, 5);
    }

    #[test]
    fn out_of_range_day_is_unresolved() {
        assert_eq!(arrival_date(2016, "February", 30), None);
        assert_eq!(arrival_date(2016, "February", 29), NaiveDate::from_ymd_opt(2016, 2, 29));
    }

    #[test]
    fn month_names_parse_case_insensitively() {
        assert_eq!(parse_month_name("july"), Some(7));
        assert_eq!(parse_month_name(" July "), Some(7));
        assert_eq!(parse_month_name("Jul"), None);
        assert_eq!(parse_month_name("7"), None);
    }

    #[test]
    fn stay_totals_and_revenue_are_exact() {
        let derived = derive(&raw_row());
        assert_eq!(derived.total_members, 3);
        assert!((derived.revenue_generated - 402.5).abs() < 1e-9);
    }

    #[test]
    fn room_change_matches_textual_inequality() {
        let mut raw = raw_row();
        assert!(derive(&raw).room_change);

        raw.assigned_room_type = "A".to_owned();
        assert!(!derive(&raw).room_change);
    }

    #[test]
    fn extreme_counts_saturate_instead_of_overflowing() {
        let mut raw = raw_row();
        raw.weekend_nights = i64::MAX;
        raw.week_nights = 1;
        raw.adults = i64::MAX;
        raw.children = 1;
        raw.babies = 1;

        let derived = derive(&raw);
        assert_eq!(derived.total_stay_nights, i64::MAX);
        assert_eq!(derived.total_members, i64::MAX);
        // A stay that long has no representable departure date.
        assert_eq!(derived.departure_date, None);
    }

    #[test]
    fn nan_adr_propagates_into_revenue() {
        let mut raw = raw_row();
        raw.adr = f64::NAN;
        assert!(derive(&raw).revenue_generated.is_nan());
    }
}
