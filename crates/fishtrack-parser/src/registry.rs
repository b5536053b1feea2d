use std::collections::BTreeSet;

use csv::ReaderBuilder;

use crate::errors::{ParserAttempt, ParserError};
use crate::layouts::{station_name_valid, DetectionLayout, InboLayout, VlizV1Layout, VlizV2Layout, VueLayout};
use crate::layouts::ColumnIndex;
use crate::model::Detection;
use crate::station_mapping::StationMapping;

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn strip_bom(bytes: &[u8]) -> &[u8] {
    if bytes.starts_with(&BOM) {
        &bytes[BOM.len()..]
    } else {
        bytes
    }
}

fn read_with_delimiter(bytes: &[u8], delimiter: u8) -> Result<csv::Reader<&[u8]>, ParserError> {
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes))
}

/// Decodes the raw bytes of a detection export into a header + body of
/// `StringRecord`s, re-decoding with a tab delimiter if the comma-delimited
/// attempt produces a single column (the hallmark of a misdetected export).
fn tokenise(bytes: &[u8]) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), ParserError> {
    let body = strip_bom(bytes);

    let mut reader = read_with_delimiter(body, b',')?;
    let header = reader.headers()?.clone();

    if header.len() == 1 {
        let mut tab_reader = read_with_delimiter(body, b'\t')?;
        let tab_header = tab_reader.headers()?.clone();
        let rows = tab_reader
            .records()
            .collect::<Result<Vec<_>, _>>()?;
        return Ok((tab_header, rows));
    }

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok((header, rows))
}

/// Parses a single detection export, recognising one of the four supported
/// tabular layouts and reconciling station names against `station_mapping`
/// when one is supplied.
pub fn parse_detections(
    bytes: &[u8],
    station_mapping: Option<&StationMapping>,
) -> Result<Vec<Detection>, ParserError> {
    let (header, rows) = tokenise(bytes)?;

    let vliz_v1 = VlizV1Layout;
    let vliz_v2 = VlizV2Layout;
    let inbo = InboLayout;
    let vue = VueLayout;
    let layouts: [&dyn DetectionLayout; 4] = [&vliz_v1, &vliz_v2, &inbo, &vue];

    let mut attempts = Vec::new();
    let layout = layouts.iter().find(|layout| layout.recognise(&header));

    let layout = match layout {
        Some(layout) => *layout,
        None => {
            for layout in &layouts {
                attempts.push(ParserAttempt::new(
                    layout.name(),
                    format!("expected columns {:?}", layout.columns()),
                ));
            }
            return Err(ParserError::UnknownFormat { attempts });
        }
    };

    if rows.is_empty() {
        return Err(ParserError::EmptyData {
            layout: layout.name(),
        });
    }

    let idx = ColumnIndex::build(&header);
    let mut detections = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        detections.push(layout.parse_row(&idx, row, row_index)?);
    }

    if let Some(mapping) = station_mapping {
        for detection in &mut detections {
            detection.station_name = mapping.reconcile(&detection.station_name, &detection.receiver_id);
        }
    }

    let offenders: BTreeSet<String> = detections
        .iter()
        .filter(|d| !station_name_valid(&d.station_name))
        .map(|d| d.station_name.clone())
        .collect();
    if !offenders.is_empty() {
        return Err(ParserError::BadStationName {
            offenders: offenders.into_iter().collect(),
        });
    }

    Ok(detections)
}
