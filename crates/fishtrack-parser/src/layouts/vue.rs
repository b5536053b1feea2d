use csv::StringRecord;

use crate::dates::parse_with_fallback;
use crate::errors::ParserError;
use crate::layouts::{first_non_empty, ColumnIndex, DetectionLayout};
use crate::model::Detection;

const NAME: &str = "vue";

const COLUMNS: &[&str] = &[
    "date_time_utc",
    "receiver_id",
    "transmitter_id",
    "old_station_name",
    "station_name",
    "latitude",
    "longitude",
];

pub struct VueLayout;

impl DetectionLayout for VueLayout {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn parse_row(
        &self,
        idx: &ColumnIndex,
        row: &StringRecord,
        row_index: usize,
    ) -> Result<Detection, ParserError> {
        let value = idx.get(row, "date_time_utc").unwrap_or_default();
        let timestamp = parse_with_fallback(
            NAME,
            row_index,
            value,
            "%Y-%m-%d %H:%M:%S",
            "%d/%m/%Y %H:%M",
        )?;

        let receiver_id = idx.get(row, "receiver_id").unwrap_or_default().to_string();
        let station_raw = idx.get(row, "station_name").unwrap_or_default();
        let station_name = first_non_empty([station_raw, receiver_id.as_str()])
            .unwrap_or_default()
            .to_string();

        Ok(Detection {
            timestamp,
            transmitter_id: idx.get(row, "transmitter_id").unwrap_or_default().to_string(),
            station_name,
            receiver_id,
        })
    }
}
