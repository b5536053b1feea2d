use csv::StringRecord;

use crate::dates::parse_with_fallback;
use crate::errors::ParserError;
use crate::layouts::{first_non_empty, ColumnIndex, DetectionLayout};
use crate::model::Detection;

const NAME: &str = "inbo";

const COLUMNS: &[&str] = &[
    "Date/Time",
    "Code Space",
    "ID",
    "Sensor 1",
    "Units 1",
    "Sensor 2",
    "Units 2",
    "Transmitter Name",
    "Transmitter S/N",
    "Receiver Name",
    "Receiver S/N",
    "Station Name",
    "Station Latitude",
    "Station Longitude",
];

pub struct InboLayout;

impl DetectionLayout for InboLayout {
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
        let value = idx.get(row, "Date/Time").unwrap_or_default();
        let timestamp = parse_with_fallback(
            NAME,
            row_index,
            value,
            "%d/%m/%Y %H:%M",
            "%Y-%m-%d %H:%M:%S",
        )?;

        let code_space = idx.get(row, "Code Space").unwrap_or_default();
        let id = idx.get(row, "ID").unwrap_or_default();
        let transmitter_id = format!("{code_space}-{id}");

        let receiver_id = idx.get(row, "Receiver Name").unwrap_or_default().to_string();
        let receiver_sn = idx.get(row, "Receiver S/N").unwrap_or_default();
        let station_raw = idx.get(row, "Station Name").unwrap_or_default();
        let station_name = first_non_empty([station_raw, receiver_id.as_str(), receiver_sn])
            .unwrap_or_default()
            .to_string();

        Ok(Detection {
            timestamp,
            transmitter_id,
            station_name,
            receiver_id,
        })
    }
}
