#![forbid(unsafe_code)]

//! Facade crate: one import surface over the stayframe engine.
//!
//! The pipeline is load → derive → filter → aggregate: [`load_table_str`]
//! builds the immutable canonical [`Table`], [`apply_filters`] produces a
//! read-only [`View`], and the `sf-agg` re-exports plus [`dashboard`]
//! turn views into metrics and chart series.

pub mod cache;
pub mod dashboard;

pub use cache::TableCache;
pub use sf_agg::{
    BusinessMetrics, DimensionField, GroupKey, MeasureField, arrival_span, count, group_by_count,
    group_by_mean, group_by_sum, mean, sum, value_counts,
};
pub use sf_derive::derive;
pub use sf_filter::{CancellationFilter, FilterSpec, RoomChangeFilter, apply_filters};
pub use sf_io::{
    LoadError, load_table_path, load_table_str, read_raw_path, read_raw_str, write_csv_string,
};
pub use sf_model::{Booking, DerivedFields, RAW_COLUMNS, RawBooking};
pub use sf_table::{Table, View};
