//! Polars export of an observation table for callers who want to keep
//! working in DataFrames.

use crate::table::observation::ObservationTable;
use crate::types::parameter::Parameter;
use chrono::NaiveDateTime;
use polars::prelude::*;

impl ObservationTable {
    /// Converts the table into a `DataFrame` with `station` and `time`
    /// index columns followed by one nullable column per parameter.
    ///
    /// `parameters` pins the column layout; a parameter with no data in the
    /// table still yields an all-null column.
    pub fn to_dataframe(&self, parameters: &[Parameter]) -> PolarsResult<DataFrame> {
        let stations: Vec<String> = self.rows().iter().map(|r| r.station.clone()).collect();
        let times: Vec<NaiveDateTime> = self.rows().iter().map(|r| r.time).collect();

        let mut columns = vec![
            Column::new("station".into(), stations),
            Column::new("time".into(), times),
        ];
        for parameter in parameters {
            let values: Vec<Option<f64>> =
                self.rows().iter().map(|r| r.value(*parameter)).collect();
            columns.push(Column::new(parameter.name().into(), values));
        }
        DataFrame::new(columns)
    }
}
