#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use sf_model::{Booking, RawBooking};

/// The canonical in-memory record set: imputed, derived, deduplicated,
/// and immutable from then on. All querying happens through [`View`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Booking>,
}

impl Table {
    /// Build the canonical table from parsed rows.
    ///
    /// Performs, in order: the dataset-wide country imputation, the
    /// derivation pass, and first-occurrence duplicate removal. Dedup
    /// is the only step that drops rows.
    #[must_use]
    pub fn from_raw(raw_rows: Vec<RawBooking>) -> Self {
        let fallback_country = most_frequent_country(&raw_rows);

        let mut rows = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            let derived = sf_derive::derive(&raw);
            rows.push(Booking::assemble(raw, &fallback_country, derived));
        }

        let before = rows.len();
        // The dedup key borrows from the rows, so the keep flags are
        // computed in a separate pass before retain mutates the vec.
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.iter().map(|row| seen.insert(row.dedup_key())).collect()
        };
        let mut keep_flags = keep.into_iter();
        rows.retain(|_| keep_flags.next().unwrap_or(false));

        #[cfg(feature = "tracing")]
        if rows.len() < before {
            tracing::debug!(
                dropped = before - rows.len(),
                retained = rows.len(),
                "removed exact duplicate rows"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = before;

        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Booking] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Booking> {
        self.rows.get(position)
    }

    /// The all-rows view, in canonical order.
    #[must_use]
    pub fn view_all(&self) -> View<'_> {
        View {
            table: self,
            positions: (0..self.rows.len()).collect(),
        }
    }

    /// A view over an explicit position subset. Positions outside the
    /// table are discarded; order is preserved as given.
    #[must_use]
    pub fn view_of(&self, positions: Vec<usize>) -> View<'_> {
        View {
            positions: positions
                .into_iter()
                .filter(|pos| *pos < self.rows.len())
                .collect(),
            table: self,
        }
    }
}

/// Ordered, read-only subset of a table's rows. Owns only the position
/// vector; the row data stays in the canonical table.
#[derive(Debug, Clone)]
pub struct View<'t> {
    table: &'t Table,
    positions: Vec<usize>,
}

impl<'t> View<'t> {
    #[must_use]
    pub fn table(&self) -> &'t Table {
        self.table
    }

    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn get(&self, nth: usize) -> Option<&'t Booking> {
        self.positions.get(nth).map(|pos| &self.table.rows[*pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'t Booking> + '_ {
        self.positions.iter().map(|pos| &self.table.rows[*pos])
    }
}

/// Two views are equal when they reference the same table and select
/// the same positions in the same order.
impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.positions == other.positions
    }
}

/// Most frequent country over the unfiltered dataset; ties break to the
/// lexicographically smallest value. Empty string when no row carries a
/// country at all.
fn most_frequent_country(rows: &[RawBooking]) -> String {
    let mut counts = HashMap::<&str, usize>::new();
    for row in rows {
        if let Some(country) = row.country.as_deref() {
            *counts.entry(country).or_default() += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (country, count) in counts {
        best = match best {
            Some((held, held_count))
                if count < held_count || (count == held_count && held < country) =>
            {
                Some((held, held_count))
            }
            _ => Some((country, count)),
        };
    }

    #[cfg(feature = "tracing")]
    if let Some((country, count)) = best {
        tracing::debug!(country, count, "country imputation fallback selected");
    }

    best.map(|(country, _)| country.to_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use sf_model::RawBooking;

    use super::Table;

    fn raw_row(hotel: &str, country: Option<&str>, adr: f64) -> RawBooking {
        RawBooking {
            hotel: hotel.to_owned(),
            is_canceled: false,
            lead_time: 10,
            arrival_year: 2016,
            arrival_month: "July".to_owned(),
            arrival_day: 3,
            weekend_nights: 1,
            week_nights: 2,
            adults: 2,
            children: 0,
            babies: 0,
            country: country.map(str::to_owned),
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

    #[test]
    fn duplicate_rows_are_removed_keeping_first_occurrence() {
        let table = Table::from_raw(vec![
            raw_row("Resort Hotel", Some("PRT"), 100.0),
            raw_row("City Hotel", Some("PRT"), 50.0),
            raw_row("Resort Hotel", Some("PRT"), 100.0),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].hotel, "Resort Hotel");
        assert_eq!(table.rows()[1].hotel, "City Hotel");
    }

    #[test]
    fn missing_country_gets_dataset_mode() {
        let table = Table::from_raw(vec![
            raw_row("Resort Hotel", Some("GBR"), 100.0),
            raw_row("City Hotel", Some("GBR"), 50.0),
            raw_row("Resort Hotel", Some("PRT"), 75.0),
            raw_row("City Hotel", None, 60.0),
        ]);

        assert_eq!(table.rows()[3].country, "GBR");
    }

    #[test]
    fn country_mode_tie_breaks_lexicographically() {
        let table = Table::from_raw(vec![
            raw_row("Resort Hotel", Some("PRT"), 100.0),
            raw_row("City Hotel", Some("GBR"), 50.0),
            raw_row("Resort Hotel", None, 75.0),
        ]);

        assert_eq!(table.rows()[2].country, "GBR");
    }

    #[test]
    fn derivation_runs_during_construction() {
        let table = Table::from_raw(vec![raw_row("Resort Hotel", Some("PRT"), 100.0)]);
        let row = &table.rows()[0];

        assert_eq!(row.derived.total_stay_nights, 3);
        assert!((row.derived.revenue_generated - 300.0).abs() < 1e-9);
    }

    #[test]
    fn view_all_preserves_canonical_order() {
        let table = Table::from_raw(vec![
            raw_row("Resort Hotel", Some("PRT"), 100.0),
            raw_row("City Hotel", Some("PRT"), 50.0),
        ]);

        let view = table.view_all();
        assert_eq!(view.positions(), &[0, 1]);
        let hotels: Vec<&str> = view.iter().map(|row| row.hotel.as_str()).collect();
        assert_eq!(hotels, ["Resort Hotel", "City Hotel"]);
    }

    #[test]
    fn view_of_discards_out_of_range_positions() {
        let table = Table::from_raw(vec![raw_row("Resort Hotel", Some("PRT"), 100.0)]);
        let view = table.view_of(vec![0, 7]);
        assert_eq!(view.positions(), &[0]);
    }
}
