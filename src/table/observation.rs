//! The normalized observation table every provider adapter produces and the
//! merge pipeline consumes.
//!
//! A table is a sequence of rows indexed by (station, timestamp), one column
//! per [`Parameter`]. Row order is insertion order and is significant: squash
//! and the priority merge both resolve duplicates by "first non-missing value
//! wins", so a stable order is what makes results reproducible.

use crate::types::parameter::Parameter;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single observation row: one station, one instant, a sparse set of
/// parameter values. A parameter with no entry is "no value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub time: NaiveDateTime,
    cells: BTreeMap<Parameter, f64>,
}

impl Observation {
    /// An all-missing row at the given index.
    pub fn new(station: impl Into<String>, time: NaiveDateTime) -> Self {
        Observation {
            station: station.into(),
            time,
            cells: BTreeMap::new(),
        }
    }

    /// Builder-style cell assignment, convenient for tests and parsers.
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.set(parameter, value);
        self
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        self.cells.get(&parameter).copied()
    }

    pub fn set(&mut self, parameter: Parameter, value: f64) {
        self.cells.insert(parameter, value);
    }

    /// Sets a cell only when `value` is present, keeping absent values as
    /// explicit "no value" rather than storing a marker.
    pub fn set_opt(&mut self, parameter: Parameter, value: Option<f64>) {
        if let Some(v) = value {
            self.set(parameter, v);
        }
    }

    /// Inserts a cell only if the parameter is still missing on this row.
    pub(crate) fn fill_cell(&mut self, parameter: Parameter, value: f64) {
        self.cells.entry(parameter).or_insert(value);
    }

    /// The populated (parameter, value) cells in parameter order.
    pub fn cells(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        self.cells.iter().map(|(p, v)| (*p, *v))
    }

    /// True when no parameter carries a value.
    pub fn is_all_missing(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn retain_parameters(&mut self, parameters: &[Parameter]) {
        self.cells.retain(|p, _| parameters.contains(p));
    }

    pub(crate) fn map_cells(&mut self, func: impl Fn(Parameter, f64) -> f64) {
        for (p, v) in self.cells.iter_mut() {
            *v = func(*p, *v);
        }
    }

    pub(crate) fn index(&self) -> (&str, NaiveDateTime) {
        (&self.station, self.time)
    }
}

/// An insertion-ordered collection of [`Observation`] rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Observation>) -> Self {
        ObservationTable { rows }
    }

    pub fn push(&mut self, row: Observation) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Observation> {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends all rows of `other` after the rows of `self`, preserving both
    /// insertion orders. No deduplication happens here.
    pub fn append(&mut self, other: ObservationTable) {
        self.rows.extend(other.rows);
    }

    /// Number of non-missing cells for a parameter across all rows,
    /// duplicates included.
    pub fn count(&self, parameter: Parameter) -> usize {
        self.rows
            .iter()
            .filter(|r| r.value(parameter).is_some())
            .count()
    }

    /// The set of parameters populated anywhere in the table, in
    /// parameter order.
    pub fn columns(&self) -> Vec<Parameter> {
        let mut set = BTreeSet::new();
        for row in &self.rows {
            set.extend(row.cells().map(|(p, _)| p));
        }
        set.into_iter().collect()
    }

    /// Station ids present in the table, in id order.
    pub fn stations(&self) -> Vec<&str> {
        let mut set = BTreeSet::new();
        for row in &self.rows {
            set.insert(row.station.as_str());
        }
        set.into_iter().collect()
    }

    /// Drops cells of parameters outside `parameters`. Rows stay in place
    /// even when all their cells are dropped.
    pub fn retain_parameters(&mut self, parameters: &[Parameter]) {
        for row in &mut self.rows {
            row.retain_parameters(parameters);
        }
    }

    /// Drops rows outside the inclusive `[start, end]` window.
    pub fn retain_window(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        self.rows.retain(|r| r.time >= start && r.time <= end);
    }

    /// Sorts rows by (station, time). Used as the final step of `fetch`.
    pub fn sort_by_index(&mut self) {
        self.rows
            .sort_by(|a, b| a.station.cmp(&b.station).then(a.time.cmp(&b.time)));
    }
}
