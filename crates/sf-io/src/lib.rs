#![forbid(unsafe_code)]

use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use sf_model::{Booking, RAW_COLUMNS, RawBooking};
use sf_table::{Table, View};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv input has no headers")]
    MissingHeaders,
    #[error("required column `{name}` is missing")]
    MissingColumn { name: &'static str },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Positions of the required columns inside one particular header row.
/// Input column order is arbitrary; columns are located by name, checked
/// once, and every row after that is a plain indexed read.
#[derive(Debug, Clone)]
struct ColumnMap {
    positions: [usize; RAW_COLUMNS.len()],
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        if headers.is_empty() {
            return Err(LoadError::MissingHeaders);
        }

        let mut positions = [0_usize; RAW_COLUMNS.len()];
        for (slot, name) in RAW_COLUMNS.iter().enumerate() {
            positions[slot] = headers
                .iter()
                .position(|header| header.trim() == *name)
                .ok_or(LoadError::MissingColumn { name })?;
        }

        // `company` and anything else unrecognized is simply never read.
        Ok(Self { positions })
    }

    fn field<'r>(&self, record: &'r StringRecord, slot: usize) -> &'r str {
        record.get(self.positions[slot]).unwrap_or_default().trim()
    }
}

// Slot indexes into RAW_COLUMNS, kept in one place so the parser and the
// writer cannot drift apart.
const HOTEL: usize = 0;
const IS_CANCELED: usize = 1;
const LEAD_TIME: usize = 2;
const ARRIVAL_YEAR: usize = 3;
const ARRIVAL_MONTH: usize = 4;
const ARRIVAL_DAY: usize = 5;
const WEEKEND_NIGHTS: usize = 6;
const WEEK_NIGHTS: usize = 7;
const ADULTS: usize = 8;
const CHILDREN: usize = 9;
const BABIES: usize = 10;
const COUNTRY: usize = 11;
const MARKET_SEGMENT: usize = 12;
const CUSTOMER_TYPE: usize = 13;
const ADR: usize = 14;
const RESERVED_ROOM_TYPE: usize = 15;
const ASSIGNED_ROOM_TYPE: usize = 16;
const BOOKING_CHANGES: usize = 17;
const AGENT: usize = 18;
const RESERVATION_STATUS: usize = 19;
const RESERVATION_STATUS_DATE: usize = 20;

/// Parse delimited text into raw rows. Fails only on structural
/// problems (missing required columns, malformed CSV); per-field
/// coercion failures degrade per the schema rules and are logged.
pub fn read_raw_str(input: &str) -> Result<Vec<RawBooking>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let map = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(parse_row(&map, &record, row));
    }

    Ok(rows)
}

pub fn read_raw_path(path: impl AsRef<Path>) -> Result<Vec<RawBooking>, LoadError> {
    let input = std::fs::read_to_string(path)?;
    read_raw_str(&input)
}

/// Load and fully construct the canonical table in one step.
pub fn load_table_str(input: &str) -> Result<Table, LoadError> {
    Ok(Table::from_raw(read_raw_str(input)?))
}

pub fn load_table_path(path: impl AsRef<Path>) -> Result<Table, LoadError> {
    Ok(Table::from_raw(read_raw_path(path)?))
}

fn parse_row(map: &ColumnMap, record: &StringRecord, row: usize) -> RawBooking {
    RawBooking {
        hotel: map.field(record, HOTEL).to_owned(),
        is_canceled: parse_flag(map.field(record, IS_CANCELED), "is_canceled", row),
        lead_time: parse_int(map.field(record, LEAD_TIME), "lead_time", row),
        arrival_year: parse_int(map.field(record, ARRIVAL_YEAR), "arrival_date_year", row),
        arrival_month: map.field(record, ARRIVAL_MONTH).to_owned(),
        arrival_day: parse_int(
            map.field(record, ARRIVAL_DAY),
            "arrival_date_day_of_month",
            row,
        ),
        weekend_nights: parse_int(
            map.field(record, WEEKEND_NIGHTS),
            "stays_in_weekend_nights",
            row,
        ),
        week_nights: parse_int(map.field(record, WEEK_NIGHTS), "stays_in_week_nights", row),
        adults: parse_int(map.field(record, ADULTS), "adults", row),
        children: parse_int(map.field(record, CHILDREN), "children", row),
        babies: parse_int(map.field(record, BABIES), "babies", row),
        country: match map.field(record, COUNTRY) {
            "" => None,
            country => Some(country.to_owned()),
        },
        market_segment: map.field(record, MARKET_SEGMENT).to_owned(),
        customer_type: map.field(record, CUSTOMER_TYPE).to_owned(),
        adr: parse_float(map.field(record, ADR), "adr", row),
        reserved_room_type: map.field(record, RESERVED_ROOM_TYPE).to_owned(),
        assigned_room_type: map.field(record, ASSIGNED_ROOM_TYPE).to_owned(),
        booking_changes: parse_int(map.field(record, BOOKING_CHANGES), "booking_changes", row),
        agent: parse_int(map.field(record, AGENT), "agent", row),
        reservation_status: map.field(record, RESERVATION_STATUS).to_owned(),
        reservation_status_date: parse_date(
            map.field(record, RESERVATION_STATUS_DATE),
            "reservation_status_date",
            row,
        ),
    }
}

/// Integer coercion ladder: i64, then f64 truncated (the upstream data
/// writes agent/children as floats), then 0. Missing is 0 without an
/// event; only a non-empty unparseable token counts as a coercion.
fn parse_int(field: &str, column: &'static str, row: usize) -> i64 {
    if field.is_empty() {
        return 0;
    }
    if let Ok(value) = field.parse::<i64>() {
        return value;
    }
    if let Ok(value) = field.parse::<f64>() {
        if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
            return value.trunc() as i64;
        }
    }

    coercion_event(column, row, field, "0");
    0
}

fn parse_float(field: &str, column: &'static str, row: usize) -> f64 {
    if let Ok(value) = field.parse::<f64>() {
        return value;
    }

    coercion_event(column, row, field, "NaN");
    f64::NAN
}

fn parse_flag(field: &str, column: &'static str, row: usize) -> bool {
    match field.parse::<i64>() {
        Ok(value) => value != 0,
        Err(_) => {
            coercion_event(column, row, field, "false");
            false
        }
    }
}

fn parse_date(field: &str, column: &'static str, row: usize) -> Option<NaiveDate> {
    if field.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(field, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            coercion_event(column, row, field, "unresolved");
            None
        }
    }
}

fn coercion_event(column: &str, row: usize, raw: &str, substituted: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(column, row, raw, substituted, "coerced unparseable field");
    #[cfg(not(feature = "tracing"))]
    let _ = (column, row, raw, substituted);
}

/// Serialize a view back to CSV in canonical column order (the required
/// input set, derived columns excluded) so a reload re-derives the
/// exact same table slice.
pub fn write_csv_string(view: &View<'_>) -> Result<String, LoadError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(RAW_COLUMNS)?;

    for booking in view.iter() {
        writer.write_record(raw_record(booking))?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn raw_record(booking: &Booking) -> [String; RAW_COLUMNS.len()] {
    [
        booking.hotel.clone(),
        if booking.is_canceled { "1" } else { "0" }.to_owned(),
        booking.lead_time.to_string(),
        booking.arrival_year.to_string(),
        booking.arrival_month.clone(),
        booking.arrival_day.to_string(),
        booking.weekend_nights.to_string(),
        booking.week_nights.to_string(),
        booking.adults.to_string(),
        booking.children.to_string(),
        booking.babies.to_string(),
        booking.country.clone(),
        booking.market_segment.clone(),
        booking.customer_type.clone(),
        float_to_csv(booking.adr),
        booking.reserved_room_type.clone(),
        booking.assigned_room_type.clone(),
        booking.booking_changes.to_string(),
        booking.agent.to_string(),
        booking.reservation_status.clone(),
        booking
            .reservation_status_date
            .map_or_else(String::new, |date| date.to_string()),
    ]
}

fn float_to_csv(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
