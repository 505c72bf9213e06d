#![forbid(unsafe_code)]

use chrono::NaiveDate;

/// Canonical raw column order: the required input columns, which is also
/// the exact header emitted on export. The unsupported `company` column
/// is not part of the schema and is dropped on load.
pub const RAW_COLUMNS: [&str; 21] = [
    "hotel",
    "is_canceled",
    "lead_time",
    "arrival_date_year",
    "arrival_date_month",
    "arrival_date_day_of_month",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adults",
    "children",
    "babies",
    "country",
    "market_segment",
    "customer_type",
    "adr",
    "reserved_room_type",
    "assigned_room_type",
    "booking_changes",
    "agent",
    "reservation_status",
    "reservation_status_date",
];

pub const DROPPED_COLUMN: &str = "company";

/// One parsed input row before dataset-wide imputation.
///
/// Row-local substitutions already happened at parse time: missing
/// `agent` and `children` are 0, an unparseable `adr` is NaN, an
/// unparseable `reservation_status_date` is `None`. `country` stays
/// `None` until the table-wide most-frequent value is known.
/// `arrival_month` keeps the raw token so an invalid month survives a
/// round trip through export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBooking {
    pub hotel: String,
    pub is_canceled: bool,
    pub lead_time: i64,
    pub arrival_year: i64,
    pub arrival_month: String,
    pub arrival_day: i64,
    pub weekend_nights: i64,
    pub week_nights: i64,
    pub adults: i64,
    pub children: i64,
    pub babies: i64,
    pub country: Option<String>,
    pub market_segment: String,
    pub customer_type: String,
    pub adr: f64,
    pub reserved_room_type: String,
    pub assigned_room_type: String,
    pub booking_changes: i64,
    pub agent: i64,
    pub reservation_status: String,
    pub reservation_status_date: Option<NaiveDate>,
}

/// Fields computed once at load time, immutable afterwards. Unresolved
/// dates stay `None` instead of failing the row.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub arrival_date: Option<NaiveDate>,
    pub arrival_day_name: Option<String>,
    pub total_stay_nights: i64,
    pub departure_date: Option<NaiveDate>,
    pub total_members: i64,
    pub revenue_generated: f64,
    pub room_change: bool,
}

/// Fully assembled row of the canonical table: raw columns (country
/// imputed to a concrete value) plus derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub hotel: String,
    pub is_canceled: bool,
    pub lead_time: i64,
    pub arrival_year: i64,
    pub arrival_month: String,
    pub arrival_day: i64,
    pub weekend_nights: i64,
    pub week_nights: i64,
    pub adults: i64,
    pub children: i64,
    pub babies: i64,
    pub country: String,
    pub market_segment: String,
    pub customer_type: String,
    pub adr: f64,
    pub reserved_room_type: String,
    pub assigned_room_type: String,
    pub booking_changes: i64,
    pub agent: i64,
    pub reservation_status: String,
    pub reservation_status_date: Option<NaiveDate>,
    pub derived: DerivedFields,
}

impl Booking {
    #[must_use]
    pub fn assemble(raw: RawBooking, fallback_country: &str, derived: DerivedFields) -> Self {
        let country = raw
            .country
            .unwrap_or_else(|| fallback_country.to_owned());
        Self {
            hotel: raw.hotel,
            is_canceled: raw.is_canceled,
            lead_time: raw.lead_time,
            arrival_year: raw.arrival_year,
            arrival_month: raw.arrival_month,
            arrival_day: raw.arrival_day,
            weekend_nights: raw.weekend_nights,
            week_nights: raw.week_nights,
            adults: raw.adults,
            children: raw.children,
            babies: raw.babies,
            country,
            market_segment: raw.market_segment,
            customer_type: raw.customer_type,
            adr: raw.adr,
            reserved_room_type: raw.reserved_room_type,
            assigned_room_type: raw.assigned_room_type,
            booking_changes: raw.booking_changes,
            agent: raw.agent,
            reservation_status: raw.reservation_status,
            reservation_status_date: raw.reservation_status_date,
            derived,
        }
    }

    /// Hashable identity over every field, float fields by bit pattern
    /// so NaN adr rows still deduplicate exactly.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey<'_> {
        DedupKey {
            hotel: &self.hotel,
            is_canceled: self.is_canceled,
            lead_time: self.lead_time,
            arrival_year: self.arrival_year,
            arrival_month: &self.arrival_month,
            arrival_day: self.arrival_day,
            weekend_nights: self.weekend_nights,
            week_nights: self.week_nights,
            adults: self.adults,
            children: self.children,
            babies: self.babies,
            country: &self.country,
            market_segment: &self.market_segment,
            customer_type: &self.customer_type,
            adr_bits: self.adr.to_bits(),
            reserved_room_type: &self.reserved_room_type,
            assigned_room_type: &self.assigned_room_type,
            booking_changes: self.booking_changes,
            agent: self.agent,
            reservation_status: &self.reservation_status,
            reservation_status_date: self.reservation_status_date,
        }
    }
}

/// Borrowed duplicate-detection key. Derived fields are pure functions
/// of the raw columns, so raw equality already implies full equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey<'a> {
    hotel: &'a str,
    is_canceled: bool,
    lead_time: i64,
    arrival_year: i64,
    arrival_month: &'a str,
    arrival_day: i64,
    weekend_nights: i64,
    week_nights: i64,
    adults: i64,
    children: i64,
    babies: i64,
    country: &'a str,
    market_segment: &'a str,
    customer_type: &'a str,
    adr_bits: u64,
    reserved_room_type: &'a str,
    assigned_room_type: &'a str,
    booking_changes: i64,
    agent: i64,
    reservation_status: &'a str,
    reservation_status_date: Option<NaiveDate>,
}
