use csv::StringRecord;

use crate::dates::parse_with_fallback;
use crate::errors::ParserError;
use crate::layouts::{first_non_empty, ColumnIndex, DetectionLayout};
use crate::model::Detection;

const NAME: &str = "vliz_v1";

const COLUMNS: &[&str] = &[
    "Date(UTC)",
    "Time(UTC)",
    "Receiver",
    "Transmitter",
    "TransmitterName",
    "TransmitterSerial",
    "SensorValue",
    "SensorUnit",
    "StationName",
    "Latitude",
    "Longitude",
];

pub struct VlizV1Layout;

impl DetectionLayout for VlizV1Layout {
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
        let date = idx.get(row, "Date(UTC)").unwrap_or_default();
        let time = idx.get(row, "Time(UTC)").unwrap_or_default();
        let combined = format!("{date} {time}");
        let timestamp = parse_with_fallback(
            NAME,
            row_index,
            &combined,
            "%Y-%m-%d %H:%M:%S",
            "%d/%m/%Y %H:%M:%S",
        )?;

        let receiver_id = idx.get(row, "Receiver").unwrap_or_default().to_string();
        let station_raw = idx.get(row, "StationName").unwrap_or_default();
        let station_name = first_non_empty([station_raw, receiver_id.as_str()])
            .unwrap_or_default()
            .to_string();

        Ok(Detection {
            timestamp,
            transmitter_id: idx.get(row, "Transmitter").unwrap_or_default().to_string(),
            station_name,
            receiver_id,
        })
    }
}
