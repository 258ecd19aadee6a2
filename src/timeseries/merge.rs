//! The priority merge engine: combines per-provider tables into one table
//! under "first writer wins" semantics at cell granularity.

use crate::table::observation::ObservationTable;
use chrono::NaiveDateTime;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Merges tables given in ascending priority-rank order (highest priority
/// first) into a single table.
///
/// The first table is taken verbatim. Every subsequent table only fills
/// cells whose (station, time, parameter) coordinate is still missing in
/// the accumulator, so a lower-priority provider can plug gaps but never
/// overwrite a value a higher-priority provider already supplied. The
/// decision is made per cell, not per row.
///
/// Duplicate-index rows inside a single input (e.g. overlapping chunks at
/// year boundaries) survive the merge; `squash` coalesces them later.
/// An empty input sequence yields an empty table.
pub fn merge_tables<I>(tables: I) -> ObservationTable
where
    I: IntoIterator<Item = ObservationTable>,
{
    let mut iter = tables.into_iter();
    let mut acc = match iter.next() {
        Some(first) => first,
        None => return ObservationTable::new(),
    };

    // Index positions per (station, time); duplicates map to several rows.
    let mut index: HashMap<(String, NaiveDateTime), Vec<usize>> = HashMap::new();
    for (i, row) in acc.rows().iter().enumerate() {
        index
            .entry((row.station.clone(), row.time))
            .or_default()
            .push(i);
    }

    for table in iter {
        for row in table.into_rows() {
            match index.entry((row.station.clone(), row.time)) {
                Entry::Vacant(slot) => {
                    slot.insert(vec![acc.len()]);
                    acc.push(row);
                }
                Entry::Occupied(slot) => {
                    let positions = slot.get().clone();
                    for (parameter, value) in row.cells() {
                        let already_present = positions
                            .iter()
                            .any(|&i| acc.rows()[i].value(parameter).is_some());
                        if !already_present {
                            acc.rows_mut()[positions[0]].set(parameter, value);
                        }
                    }
                }
            }
        }
    }
    acc
}
