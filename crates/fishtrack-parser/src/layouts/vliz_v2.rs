use csv::StringRecord;

use crate::errors::ParserError;
use crate::layouts::{first_non_empty, ColumnIndex, DetectionLayout};
use crate::model::Detection;

const NAME: &str = "vliz_v2";

const COLUMNS: &[&str] = &[
    "Date and Time (UTC)",
    "Receiver",
    "Transmitter",
    "Transmitter Name",
    "Transmitter Serial",
    "Sensor Value",
    "Sensor Unit",
    "Station Name",
    "Latitude",
    "Longitude",
];

pub struct VlizV2Layout;

impl DetectionLayout for VlizV2Layout {
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
        let value = idx.get(row, "Date and Time (UTC)").unwrap_or_default();
        let timestamp =
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map_err(|_| {
                ParserError::BadDateTime {
                    layout: NAME,
                    row_index,
                    value: value.to_string(),
                }
            })?;

        let receiver_id = idx.get(row, "Receiver").unwrap_or_default().to_string();
        let station_raw = idx.get(row, "Station Name").unwrap_or_default();
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
