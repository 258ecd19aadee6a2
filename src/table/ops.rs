//! Table mutations used by `TimeSeries::fetch`: squash, fill and localize.
//!
//! All three return a new table; the receiver is never modified.

use crate::table::observation::{Observation, ObservationTable};
use crate::types::parameter::Parameter;
use chrono::{Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

impl ObservationTable {
    /// Coalesces rows sharing the same (station, time) index into one row
    /// per index, taking the first non-missing value per column in row
    /// order. Idempotent.
    pub fn squash(&self) -> ObservationTable {
        let mut out: Vec<Observation> = Vec::with_capacity(self.len());
        let mut index: HashMap<(String, NaiveDateTime), usize> = HashMap::new();
        for row in self.rows() {
            match index.entry((row.station.clone(), row.time)) {
                Entry::Occupied(slot) => {
                    let target = &mut out[*slot.get()];
                    for (parameter, value) in row.cells() {
                        target.fill_cell(parameter, value);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(out.len());
                    out.push(row.clone());
                }
            }
        }
        ObservationTable::with_rows(out)
    }

    /// Extends the table to the complete regular timestamp grid between
    /// `start` and `end` inclusive, one row per `step` per station, adding
    /// all-missing rows where no observation exists. Existing rows are
    /// carried over unchanged.
    pub fn fill(
        &self,
        stations: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
        step: Duration,
    ) -> ObservationTable {
        let present: HashSet<(&str, NaiveDateTime)> =
            self.rows().iter().map(|r| r.index()).collect();
        let mut out = self.clone();
        for station in stations {
            let mut t = start;
            while t <= end {
                if !present.contains(&(station.as_str(), t)) {
                    out.push(Observation::new(station.clone(), t));
                }
                t += step;
            }
        }
        out
    }

    /// Shifts all timestamps from UTC into `tz` wall-clock time. The
    /// physical instant each row represents is unchanged.
    pub fn localize(&self, tz: Tz) -> ObservationTable {
        let mut out = self.clone();
        for row in out.rows_mut() {
            row.time = tz.from_utc_datetime(&row.time).naive_local();
        }
        out
    }

    /// Maps `func` over every populated cell, or only over one parameter's
    /// column when `parameter` is given.
    pub(crate) fn map_values(
        &self,
        func: &dyn Fn(f64) -> f64,
        parameter: Option<Parameter>,
    ) -> ObservationTable {
        let mut out = self.clone();
        for row in out.rows_mut() {
            row.map_cells(|p, v| match parameter {
                Some(target) if target != p => v,
                _ => func(v),
            });
        }
        out
    }
}
